//! Application layer for the device.
//!
//! - **`message_receiver`** – The callback trait the device application
//!   implements to hear acks, data, and fling results.
//!
//! - **`device_adapter`** – The [`DeviceAdapter`](device_adapter::DeviceAdapter)
//!   facade and its correlator, which builds request envelopes and classifies
//!   server responses.
//!
//! - **`factory`** – Builds an adapter over any async byte stream, with or
//!   without a background receive loop.

pub mod device_adapter;
pub mod factory;
pub mod message_receiver;
