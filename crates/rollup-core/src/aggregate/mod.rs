mod accumulator;
mod kind;

pub use accumulator::{Accumulator, new_accumulator};
pub use kind::{AggKind, FcnSpec};

use std::collections::HashMap;

use crate::record::{Record, Value};

/// Per-window accumulator table, keyed by field name and kept in
/// first-seen order.
#[derive(Default)]
struct FieldAccumulators {
    order: Vec<String>,
    states: HashMap<String, Box<dyn Accumulator>>,
}

impl FieldAccumulators {
    fn absorb(&mut self, field: &str, value: f64, fcn: &FcnSpec) {
        if let Some(state) = self.states.get_mut(field) {
            state.absorb(value);
            return;
        }
        let mut state = new_accumulator(fcn.kind_for(field));
        state.absorb(value);
        self.order.push(field.to_string());
        self.states.insert(field.to_string(), state);
    }

    fn finalize_into(self, out: &mut Record) {
        let FieldAccumulators { order, states } = self;
        for field in order {
            if let Some(state) = states.get(&field) {
                out.insert(field, Value::Number(state.finalize()));
            }
        }
    }
}

/// Reduce the records of one window to a single merged record.
///
/// Numeric fields are combined with the kind `fcn` selects for them.
/// Everything else is carried over unchanged from the first record. The
/// `time_field` is never aggregated; the caller overwrites it with the
/// window start. An empty window yields an empty record.
pub fn aggregate(records: &[&Record], fcn: &FcnSpec, time_field: &str) -> Record {
    let Some(first) = records.first() else {
        return Record::new();
    };

    let mut accumulators = FieldAccumulators::default();
    for record in records {
        for (field, value) in record.iter() {
            if field == time_field {
                continue;
            }
            if let Some(n) = value.as_number() {
                accumulators.absorb(field, n, fcn);
            }
        }
    }

    let mut merged = (*first).clone();
    accumulators.finalize_into(&mut merged);
    merged
}
