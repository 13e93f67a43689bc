#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Mutex, Once};

    use log::{LevelFilter, Log, Metadata, Record};
    use tempfile::TempDir;
    use wordstat::stats::WordCounter;
    use wordstat::task::{TaskConfig, TaskRunner};

    /// Keeps every record as `(target, message)`.
    struct CaptureLogger {
        records: Mutex<Vec<(String, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.target().to_string(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        records: Mutex::new(Vec::new()),
    };
    static INIT: Once = Once::new();

    fn captured() -> &'static CaptureLogger {
        INIT.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(LevelFilter::Debug);
        });
        &LOGGER
    }

    #[test]
    fn test_skipped_files_logged_under_run_target() {
        let logger = captured();
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("good.txt"), "fine words").unwrap();
        fs::write(input.join("broken_input.txt"), b"bad \xff bytes").unwrap();

        let report = TaskRunner::new(TaskConfig::default())
            .unwrap()
            .run_dir(&WordCounter::new(dir.path().join("out.txt")), &input)
            .unwrap();
        assert_eq!(report.summary.files_skipped, 1);

        let records = logger.records.lock().unwrap();
        let skips: Vec<_> = records
            .iter()
            .filter(|(_, message)| message.contains("Skipping"))
            .collect();
        assert!(skips.iter().any(|(_, message)| message.contains("broken_input.txt")));
        assert!(skips.iter().all(|(target, _)| target == "wordstat::run::word_count"));
    }
}
