use contracts::usecases::u501_bulk_import::{spreadsheet_row, ImportResult};

use super::collection_client::CollectionClient;

/// Создает записи строго по одной: запрос N+1 уходит только после ответа на N.
///
/// Ошибка одной записи не прерывает пачку. Номер строки в ошибке = индекс + 2,
/// как у ошибок проверки файла. `on_progress(processed, total)` вызывается
/// после каждой записи.
pub async fn commit<R, C>(
    records: &[R],
    client: &C,
    mut on_progress: impl FnMut(usize, usize),
) -> ImportResult
where
    R: Sync,
    C: CollectionClient<R> + ?Sized,
{
    let total = records.len();
    let mut result = ImportResult::new();

    for (index, record) in records.iter().enumerate() {
        match client.create(record).await {
            Ok(()) => result.record_success(),
            Err(e) => {
                tracing::warn!("Row {}: create failed: {}", spreadsheet_row(index), e);
                result.record_failure(index, e.to_string());
            }
        }
        on_progress(index + 1, total);
    }

    tracing::info!(
        "Commit finished: {} submitted, {} created, {} failed",
        total,
        result.success,
        result.failed
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_bulk_import::collection_client::CommitError;
    use async_trait::async_trait;
    use contracts::usecases::u501_bulk_import::ImportRowError;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Клиент, который отклоняет записи с заданными значениями
    /// и записывает порядок начала и окончания вызовов.
    struct ScriptedClient {
        reject: Vec<(&'static str, Option<&'static str>)>,
        log: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(reject: Vec<(&'static str, Option<&'static str>)>) -> Self {
            Self {
                reject,
                log: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CollectionClient<String> for ScriptedClient {
        async fn create(&self, record: &String) -> Result<(), CommitError> {
            self.log.lock().unwrap().push(format!("start {}", record));
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.log.lock().unwrap().push(format!("end {}", record));

            match self.reject.iter().find(|(value, _)| *value == record.as_str()) {
                Some((_, Some(message))) => Err(CommitError::Rejected(message.to_string())),
                Some((_, None)) => Err(CommitError::Unknown),
                None => Ok(()),
            }
        }
    }

    fn records(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn partial_failure_keeps_going() {
        let client = ScriptedClient::new(vec![("b", Some("duplicate"))]);
        let result = commit(&records(&["a", "b", "c"]), &client, |_, _| {}).await;

        assert_eq!(
            result,
            ImportResult {
                success: 2,
                failed: 1,
                errors: vec![ImportRowError {
                    row: 3,
                    error: "duplicate".into()
                }],
            }
        );
    }

    #[tokio::test]
    async fn requests_are_strictly_sequential() {
        let client = ScriptedClient::new(vec![]);
        commit(&records(&["a", "b", "c"]), &client, |_, _| {}).await;

        let log = client.log.lock().unwrap().clone();
        assert_eq!(
            log,
            vec!["start a", "end a", "start b", "end b", "start c", "end c"]
        );
    }

    #[tokio::test]
    async fn all_failures_are_counted() {
        let client = ScriptedClient::new(vec![("a", None), ("b", Some("boom"))]);
        let result = commit(&records(&["a", "b"]), &client, |_, _| {}).await;

        assert_eq!(result.success + result.failed, 2);
        assert_eq!(result.failed, 2);
        assert_eq!(result.errors[0].error, "Unknown error occurred");
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[1].row, 3);
    }

    #[tokio::test]
    async fn progress_is_reported_per_record() {
        let client = ScriptedClient::new(vec![("b", Some("nope"))]);
        let mut seen = Vec::new();
        commit(&records(&["a", "b"]), &client, |done, total| seen.push((done, total))).await;
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let client = ScriptedClient::new(vec![]);
        let result = commit(&Vec::<String>::new(), &client, |_, _| {}).await;
        assert_eq!(result.attempted(), 0);
        assert!(result.is_complete_success());
    }
}
