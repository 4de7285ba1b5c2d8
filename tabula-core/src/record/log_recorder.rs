use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes records to the log at `info` level.
///
/// Written records are logged immediately. Stored records are aggregated
/// and logged on flush.
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

fn format_record(record: &Record) -> String {
    let mut items: Vec<_> = record
        .iter()
        .map(|(k, v)| match v {
            RecordValue::Scalar(v) => format!("{} = {:.4}", k, v),
            RecordValue::String(s) => format!("{} = {}", k, s),
            RecordValue::Array1(v) => format!("{} = [{} values]", k, v.len()),
        })
        .collect();
    items.sort();
    items.join(", ")
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", format_record(&record));
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let record = self.storage.aggregate();
        info!("Episode {}: {}", step, format_record(&record));
    }
}
