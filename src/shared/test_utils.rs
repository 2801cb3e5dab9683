//! Test utilities for property-based and store-dependent tests
//!
//! Provides proptest generators for domain objects and `MockRedis`, an
//! in-memory stand-in for a Redis connection that interprets the command
//! subset this service issues. No test needs a live store.

pub mod generators {
    use proptest::prelude::*;

    use crate::domain::Device;

    /// Generate a valid device id (safe charset, no key-separator colons)
    pub fn device_id() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9-]{0,15}"
    }

    /// Generate a non-empty device name
    pub fn device_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,19}"
    }

    /// Generate a device type from the simulated fleet
    pub fn device_type() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("light".to_string()),
            Just("thermostat".to_string()),
            Just("lock".to_string()),
            Just("camera".to_string()),
            Just("sensor".to_string()),
        ]
    }

    /// Generate a device status string
    pub fn device_status() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("active".to_string()),
            Just("idle".to_string()),
            Just("maintenance".to_string()),
        ]
    }

    /// Generate a complete valid Device
    pub fn device() -> impl Strategy<Value = Device> {
        (
            device_id(),
            device_name(),
            device_type(),
            device_status(),
            any::<bool>(),
        )
            .prop_map(|(id, name, device_type, status, online)| Device {
                id,
                name,
                device_type,
                status,
                online,
            })
    }

    /// Generate an arbitrary stored `online` field value
    ///
    /// Mixes canonical values, case variants, and junk so coercion rules
    /// are exercised across the full input space.
    pub fn online_field() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("true".to_string()),
            Just("false".to_string()),
            Just("TRUE".to_string()),
            Just("True".to_string()),
            Just("FALSE".to_string()),
            "[a-z]{0,8}",
        ]
    }
}

pub mod mock_store {
    use redis::aio::ConnectionLike;
    use redis::{Arg, Cmd, ErrorKind, Pipeline, RedisError, RedisFuture, Value};
    use std::collections::HashMap;

    /// In-memory stand-in for a Redis connection
    ///
    /// Interprets the commands the service issues (PING, SCAN, HGETALL,
    /// LPUSH, LTRIM). State is inspectable directly; the offline switch
    /// makes every command fail the way a dropped connection would.
    #[derive(Debug, Default)]
    pub struct MockRedis {
        hashes: HashMap<String, HashMap<String, String>>,
        lists: HashMap<String, Vec<String>>,
        offline: bool,
    }

    impl MockRedis {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a hash record
        pub fn insert_hash(&mut self, key: &str, fields: &[(&str, &str)]) {
            self.hashes.insert(
                key.to_string(),
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            );
        }

        /// Seed a list (index 0 = newest)
        pub fn insert_list(&mut self, key: &str, entries: &[&str]) {
            self.lists.insert(
                key.to_string(),
                entries.iter().map(|e| e.to_string()).collect(),
            );
        }

        /// Simulate loss of connectivity
        pub fn set_offline(&mut self, offline: bool) {
            self.offline = offline;
        }

        /// Read a list back for assertions (index 0 = newest)
        pub fn list(&self, key: &str) -> Vec<String> {
            self.lists.get(key).cloned().unwrap_or_default()
        }

        pub fn list_len(&self, key: &str) -> usize {
            self.lists.get(key).map(|l| l.len()).unwrap_or(0)
        }

        fn execute(&mut self, args: &[String]) -> Result<Value, RedisError> {
            if self.offline {
                return Err(RedisError::from((
                    ErrorKind::IoError,
                    "mock store offline",
                )));
            }

            let command = args
                .first()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_default();

            match command.as_str() {
                "PING" => Ok(Value::SimpleString("PONG".to_string())),
                "SCAN" => self.exec_scan(args),
                "HGETALL" => Ok(self.exec_hgetall(&args[1])),
                "LPUSH" => Ok(self.exec_lpush(&args[1], &args[2..])),
                "LTRIM" => self.exec_ltrim(&args[1], &args[2], &args[3]),
                "MULTI" | "EXEC" => Ok(Value::Okay),
                other => Err(RedisError::from((
                    ErrorKind::ClientError,
                    "unsupported command in mock",
                    other.to_string(),
                ))),
            }
        }

        fn exec_scan(&self, args: &[String]) -> Result<Value, RedisError> {
            let cursor: usize = args
                .get(1)
                .and_then(|c| c.parse().ok())
                .unwrap_or_default();
            let pattern = arg_after(args, "MATCH").unwrap_or_else(|| "*".to_string());
            let count: usize = arg_after(args, "COUNT")
                .and_then(|c| c.parse().ok())
                .unwrap_or(10);

            // Stable iteration order keeps cursors meaningful across pages
            let mut keys: Vec<&String> = self
                .hashes
                .keys()
                .chain(self.lists.keys())
                .filter(|key| matches_pattern(key, &pattern))
                .collect();
            keys.sort();

            let page: Vec<Value> = keys
                .iter()
                .skip(cursor)
                .take(count)
                .map(|key| Value::BulkString(key.as_bytes().to_vec()))
                .collect();

            let next = if cursor + count >= keys.len() {
                0
            } else {
                cursor + count
            };

            Ok(Value::Array(vec![
                Value::BulkString(next.to_string().into_bytes()),
                Value::Array(page),
            ]))
        }

        fn exec_hgetall(&self, key: &str) -> Value {
            let mut flat = Vec::new();
            if let Some(fields) = self.hashes.get(key) {
                for (field, value) in fields {
                    flat.push(Value::BulkString(field.as_bytes().to_vec()));
                    flat.push(Value::BulkString(value.as_bytes().to_vec()));
                }
            }
            Value::Array(flat)
        }

        fn exec_lpush(&mut self, key: &str, values: &[String]) -> Value {
            let list = self.lists.entry(key.to_string()).or_default();
            for value in values {
                list.insert(0, value.clone());
            }
            Value::Int(list.len() as i64)
        }

        fn exec_ltrim(&mut self, key: &str, start: &str, stop: &str) -> Result<Value, RedisError> {
            let (start, stop): (i64, i64) = match (start.parse(), stop.parse()) {
                (Ok(start), Ok(stop)) => (start, stop),
                _ => {
                    return Err(RedisError::from((
                        ErrorKind::ResponseError,
                        "value is not an integer",
                    )))
                }
            };

            if let Some(list) = self.lists.get_mut(key) {
                let len = list.len() as i64;
                let resolve = |index: i64| {
                    if index < 0 {
                        (len + index).max(0)
                    } else {
                        index.min(len)
                    }
                };
                let start = resolve(start) as usize;
                let stop = resolve(stop);

                if start as i64 > stop {
                    list.clear();
                } else {
                    let stop = (stop as usize + 1).min(list.len());
                    *list = list[start..stop].to_vec();
                }
            }
            Ok(Value::Okay)
        }
    }

    fn arg_after(args: &[String], name: &str) -> Option<String> {
        args.iter()
            .position(|a| a.eq_ignore_ascii_case(name))
            .and_then(|i| args.get(i + 1))
            .cloned()
    }

    fn matches_pattern(key: &str, pattern: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        }
    }

    fn cmd_args(cmd: &Cmd) -> Vec<String> {
        cmd.args_iter()
            .map(|arg| match arg {
                Arg::Simple(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                Arg::Cursor => "0".to_string(),
            })
            .collect()
    }

    impl ConnectionLike for MockRedis {
        fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
            let result = self.execute(&cmd_args(cmd));
            Box::pin(async move { result })
        }

        fn req_packed_commands<'a>(
            &'a mut self,
            pipeline: &'a Pipeline,
            offset: usize,
            _count: usize,
        ) -> RedisFuture<'a, Vec<Value>> {
            let mut results = Vec::new();
            let mut failure = None;

            for cmd in pipeline.cmd_iter() {
                match self.execute(&cmd_args(cmd)) {
                    Ok(value) => results.push(value),
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }

            let response = match failure {
                Some(err) => Err(err),
                // Plain pipelines want per-command replies; transactions
                // want the single EXEC reply holding them all.
                None if offset == 0 => Ok(results),
                None => Ok(vec![Value::Array(results)]),
            };
            Box::pin(async move { response })
        }

        fn get_db(&self) -> i64 {
            0
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use redis::AsyncCommands;
        use std::collections::HashMap;

        #[tokio::test]
        async fn test_hgetall_roundtrip() {
            let mut mock = MockRedis::new();
            mock.insert_hash("device:d1", &[("name", "Lamp"), ("type", "light")]);

            let fields: HashMap<String, String> = mock.hgetall("device:d1").await.unwrap();
            assert_eq!(fields["name"], "Lamp");
            assert_eq!(fields["type"], "light");
        }

        #[tokio::test]
        async fn test_hgetall_missing_key_is_empty() {
            let mut mock = MockRedis::new();
            let fields: HashMap<String, String> = mock.hgetall("device:nope").await.unwrap();
            assert!(fields.is_empty());
        }

        #[tokio::test]
        async fn test_lpush_prepends() {
            let mut mock = MockRedis::new();
            let _: i64 = mock.lpush("k", "a").await.unwrap();
            let _: i64 = mock.lpush("k", "b").await.unwrap();
            assert_eq!(mock.list("k"), vec!["b", "a"]);
        }

        #[tokio::test]
        async fn test_ltrim_bounds() {
            let mut mock = MockRedis::new();
            mock.insert_list("k", &["a", "b", "c", "d"]);

            let _: () = mock.ltrim("k", 0, 1).await.unwrap();
            assert_eq!(mock.list("k"), vec!["a", "b"]);
        }

        #[tokio::test]
        async fn test_offline_mock_errors() {
            let mut mock = MockRedis::new();
            mock.set_offline(true);

            let result: Result<HashMap<String, String>, _> = mock.hgetall("device:d1").await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_scan_pages_through_keys() {
            let mut mock = MockRedis::new();
            for i in 0..7 {
                mock.insert_hash(&format!("device:d{}", i), &[("name", "x")]);
            }

            let mut cursor: u64 = 0;
            let mut seen = Vec::new();
            loop {
                let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg("device:*")
                    .arg("COUNT")
                    .arg(3)
                    .query_async(&mut mock)
                    .await
                    .unwrap();
                seen.extend(keys);
                cursor = next;
                if cursor == 0 {
                    break;
                }
            }

            assert_eq!(seen.len(), 7);
        }
    }
}
