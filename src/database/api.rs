use std::sync::{Arc, LazyLock, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use crate::app::FirebaseApp;
use crate::database::error::{
    invalid_argument, transaction_aborted, DatabaseResult,
};
use crate::database::push_id::next_push_id;
use crate::logger::Logger;

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("database"));

const INVALID_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']'];

/// Realtime-database session bound to one application context, backed by an
/// in-memory JSON tree.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    app: FirebaseApp,
    root: Mutex<Value>,
}

impl Database {
    pub fn get_instance(app: &FirebaseApp) -> DatabaseResult<Self> {
        app.check_destroyed()?;
        Ok(Self {
            inner: Arc::new(DatabaseInner {
                app: app.clone(),
                root: Mutex::new(Value::Null),
            }),
        })
    }

    pub fn app(&self) -> &FirebaseApp {
        &self.inner.app
    }

    pub fn root_reference(&self) -> DatabaseReference {
        DatabaseReference {
            database: self.clone(),
            path: Vec::new(),
        }
    }

    pub fn reference(&self, path: &str) -> DatabaseResult<DatabaseReference> {
        Ok(DatabaseReference {
            database: self.clone(),
            path: parse_path(path)?,
        })
    }

    fn root_url(&self) -> String {
        let options = self.inner.app.options();
        match options.database_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => {
                let project = options
                    .project_id
                    .unwrap_or_else(|| self.inner.app.name().to_owned());
                format!("https://{project}-default-rtdb.firebaseio.com")
            }
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("app", &self.inner.app.name())
            .finish()
    }
}

/// Location in the database tree. References are cheap to clone and carry
/// their absolute path.
#[derive(Clone, Debug)]
pub struct DatabaseReference {
    database: Database,
    path: Vec<String>,
}

impl DatabaseReference {
    pub fn key(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn url(&self) -> String {
        let root = self.database.root_url();
        if self.path.is_empty() {
            root
        } else {
            format!("{root}/{}", self.path.join("/"))
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.database.inner.app.is_deleted()
    }

    pub fn child(&self, relative: &str) -> DatabaseResult<DatabaseReference> {
        let mut path = self.path.clone();
        path.extend(parse_path(relative)?);
        Ok(DatabaseReference {
            database: self.database.clone(),
            path,
        })
    }

    /// Append a fresh, chronologically ordered child key.
    pub fn push_child(&self) -> DatabaseReference {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or(0);
        let mut path = self.path.clone();
        path.push(next_push_id(now));
        DatabaseReference {
            database: self.database.clone(),
            path,
        }
    }

    /// Write `value` at this location. Writing `Null` removes the node.
    pub async fn set_value(&self, value: Value) -> DatabaseResult<()> {
        self.database.inner.app.check_destroyed()?;
        let mut root = self.database.inner.root.lock().unwrap();
        tree_set(&mut root, &self.path, value);
        LOGGER.debug(format!("Set value at {}", self.url()));
        Ok(())
    }

    pub async fn get_value(&self) -> DatabaseResult<DataSnapshot> {
        self.database.inner.app.check_destroyed()?;
        let root = self.database.inner.root.lock().unwrap();
        let value = tree_get(&root, &self.path).cloned().unwrap_or(Value::Null);
        Ok(DataSnapshot {
            key: self.key().map(str::to_owned),
            value,
        })
    }

    pub async fn remove_value(&self) -> DatabaseResult<()> {
        self.set_value(Value::Null).await
    }

    /// Atomically read, mutate, and write back the node at this location.
    /// Returns the post-transaction snapshot on success.
    pub async fn run_transaction<F>(&self, mut update: F) -> DatabaseResult<DataSnapshot>
    where
        F: FnMut(&mut MutableData) -> TransactionResult,
    {
        self.database.inner.app.check_destroyed()?;
        let mut root = self.database.inner.root.lock().unwrap();
        let current = tree_get(&root, &self.path).cloned().unwrap_or(Value::Null);
        let mut data = MutableData { value: current };

        match update(&mut data) {
            TransactionResult::Success => {
                tree_set(&mut root, &self.path, data.value.clone());
                LOGGER.debug(format!("Transaction committed at {}", self.url()));
                Ok(DataSnapshot {
                    key: self.key().map(str::to_owned),
                    value: data.value,
                })
            }
            TransactionResult::Abort => {
                Err(transaction_aborted(format!(
                    "transaction at {} aborted by update closure",
                    self.url()
                )))
            }
        }
    }
}

/// Outcome of a transaction update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionResult {
    Success,
    Abort,
}

/// Node value handed to transaction closures for in-place mutation.
#[derive(Clone, Debug)]
pub struct MutableData {
    value: Value,
}

impl MutableData {
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn child(&self, name: &str) -> Value {
        self.value.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn set_child(&mut self, name: &str, value: Value) {
        if !self.value.is_object() {
            self.value = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.value {
            if value.is_null() {
                map.remove(name);
            } else {
                map.insert(name.to_owned(), value);
            }
        }
    }
}

/// Immutable view of a node's value at read time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSnapshot {
    key: Option<String>,
    value: Value,
}

impl DataSnapshot {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    pub fn child(&self, name: &str) -> DataSnapshot {
        DataSnapshot {
            key: Some(name.to_owned()),
            value: self.value.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.value.get(name).is_some()
    }

    pub fn children_count(&self) -> usize {
        match &self.value {
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }
}

fn parse_path(path: &str) -> DatabaseResult<Vec<String>> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(INVALID_KEY_CHARS) {
            return Err(invalid_argument(format!(
                "path segment '{segment}' contains an illegal character"
            )));
        }
        segments.push(segment.to_owned());
    }
    Ok(segments)
}

fn tree_get<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in path {
        node = node.get(segment)?;
    }
    Some(node)
}

fn tree_set(root: &mut Value, path: &[String], value: Value) {
    if path.is_empty() {
        *root = value;
        return;
    }

    if value.is_null() {
        tree_remove(root, path);
        return;
    }

    let mut node = root;
    for segment in &path[..path.len() - 1] {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("node was just made an object")
            .entry(segment.clone())
            .or_insert(Value::Null);
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        map.insert(path[path.len() - 1].clone(), value);
    }
}

// Removes the node and prunes any parent objects left empty.
fn tree_remove(root: &mut Value, path: &[String]) {
    if path.is_empty() {
        *root = Value::Null;
        return;
    }
    if let Value::Object(map) = root {
        if path.len() == 1 {
            map.remove(&path[0]);
        } else if let Some(node) = map.get_mut(&path[0]) {
            tree_remove(node, &path[1..]);
            if matches!(node, Value::Object(child) if child.is_empty()) {
                map.remove(&path[0]);
            }
        }
        if map.is_empty() {
            *root = Value::Null;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_firebase_app;
    use serde_json::json;

    fn test_database(name: &str) -> Database {
        let app = test_firebase_app(name);
        Database::get_instance(&app).expect("database")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn set_and_get_round_trip() {
        let database = test_database("db-set-get");
        let reference = database.reference("rooms/lobby/title").unwrap();

        reference.set_value(json!("welcome")).await.unwrap();
        let snapshot = reference.get_value().await.unwrap();
        assert!(snapshot.exists());
        assert_eq!(snapshot.value(), &json!("welcome"));
        assert_eq!(snapshot.key(), Some("title"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn remove_prunes_empty_parents() {
        let database = test_database("db-remove");
        let reference = database.reference("a/b/c").unwrap();
        reference.set_value(json!(1)).await.unwrap();

        reference.remove_value().await.unwrap();
        let root = database.root_reference().get_value().await.unwrap();
        assert!(!root.exists());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn push_child_keys_are_ordered() {
        let database = test_database("db-push");
        let list = database.reference("list").unwrap();
        let first = list.push_child();
        let second = list.push_child();
        assert!(first.key().unwrap() < second.key().unwrap());
        assert!(first.url().starts_with(&list.url()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejects_illegal_path_segments() {
        let database = test_database("db-illegal");
        assert!(database.reference("ok/fine").is_ok());
        assert!(database.reference("bad.key").is_err());
        assert!(database.reference("bad#key").is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn transaction_reads_and_writes_atomically() {
        let database = test_database("db-transaction");
        let node = database.reference("game/state").unwrap();
        node.child("score").unwrap().set_value(json!(10)).await.unwrap();

        let snapshot = node
            .run_transaction(|data| {
                let score = data.child("score").as_i64().unwrap_or(0);
                data.set_child("score", json!(score + 5));
                data.set_child("phase", json!("endgame"));
                TransactionResult::Success
            })
            .await
            .unwrap();

        assert_eq!(snapshot.child("score").value(), &json!(15));
        assert_eq!(snapshot.child("phase").value(), &json!("endgame"));
        let read_back = node.get_value().await.unwrap();
        assert_eq!(read_back.value(), snapshot.value());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn aborted_transaction_leaves_node_untouched() {
        let database = test_database("db-abort");
        let node = database.reference("game/state").unwrap();
        node.set_value(json!({"score": 10})).await.unwrap();

        let result = node
            .run_transaction(|data| {
                data.set_child("score", json!(999));
                TransactionResult::Abort
            })
            .await;
        assert!(result.is_err());

        let snapshot = node.get_value().await.unwrap();
        assert_eq!(snapshot.child("score").value(), &json!(10));
    }
}
