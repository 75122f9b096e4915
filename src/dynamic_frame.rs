//! Dynamic key-value view over one decoded datagram.
//!
//! The decoder knows nothing about what a channel means. It walks the
//! [`DecodePlan`] in order, consumes exactly each primitive's width, and keeps
//! the result addressable by channel id. Domain semantics live in the
//! [`Normalizer`](crate::adapters::Normalizer).

use std::collections::HashMap;
use std::sync::Arc;

use crate::DecodeError;
use crate::schema::DecodePlan;
use crate::types::{ChannelDefinition, Value};

/// A self-contained view over a single datagram supporting by-name lookups.
#[derive(Debug, Clone)]
pub struct DynamicFrame {
    values: Vec<Value>,
    index: Arc<HashMap<String, usize>>,
    plan: Arc<DecodePlan>,
}

impl DynamicFrame {
    /// Decode `data` positionally against `plan`.
    ///
    /// The datagram must be exactly `plan.byte_len()` bytes. Anything else is
    /// rejected; UDP telemetry is never resent, so the caller simply drops it.
    pub fn decode(plan: &Arc<DecodePlan>, data: &[u8]) -> Result<Self, DecodeError> {
        DynamicDecoder::new(Arc::clone(plan)).decode(data)
    }

    /// Value of a channel, if the plan carries it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).and_then(|idx| self.values.get(*idx))
    }

    /// Numeric value of a channel, booleans as 0/1.
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).map(Value::as_f64)
    }

    /// Decoded values in plan order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterate `(channel, value)` pairs in plan order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChannelDefinition, &Value)> {
        self.plan.channels().iter().zip(&self.values)
    }

    pub fn plan(&self) -> &DecodePlan {
        &self.plan
    }
}

/// Reusable decoder holding the plan and its precomputed name index.
///
/// Sources keep one of these for the lifetime of the engine so the id → slot
/// map is built once rather than per datagram.
#[derive(Debug, Clone)]
pub struct DynamicDecoder {
    plan: Arc<DecodePlan>,
    index: Arc<HashMap<String, usize>>,
}

impl DynamicDecoder {
    pub fn new(plan: Arc<DecodePlan>) -> Self {
        // A repeated id maps to its last slot.
        let index = plan
            .channels()
            .iter()
            .enumerate()
            .map(|(slot, channel)| (channel.id.clone(), slot))
            .collect();
        Self { plan, index: Arc::new(index) }
    }

    pub fn plan(&self) -> &Arc<DecodePlan> {
        &self.plan
    }

    /// Decode one datagram.
    pub fn decode(&self, data: &[u8]) -> Result<DynamicFrame, DecodeError> {
        let expected = self.plan.byte_len();
        if data.len() != expected {
            return Err(DecodeError::LengthMismatch { expected, actual: data.len() });
        }

        let mut values = Vec::with_capacity(self.plan.channel_count());
        let mut offset = 0;
        for channel in self.plan.channels() {
            let value = channel
                .primitive_type
                .read(data, offset)
                .ok_or(DecodeError::LengthMismatch { expected, actual: data.len() })?;
            values.push(value);
            offset += channel.size();
        }

        Ok(DynamicFrame { values, index: Arc::clone(&self.index), plan: Arc::clone(&self.plan) })
    }
}
