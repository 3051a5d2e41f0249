//! In-memory stand-in for a PostgreSQL cluster, enough to drive the
//! comment controller without a server.
//!
//! It understands exactly the statements and lookups the translator emits,
//! buffers writes until commit, and records every transaction event so
//! tests can assert on routing and rollback behaviour.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pgcomment::ObjectType;
use pgcomment::db::{
    CommentTransaction, ConnectionProvider, FeatureGate, ServerVersion,
};
use pgcomment::error::CommentError;
use pgcomment::render::lookup_query;

/// Object key: type, owning database ("" for cluster-wide objects), name
type ObjectKey = (ObjectType, String, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Begin(String),
    Execute(String, String),
    Lookup(String, String),
    Commit(String),
    Rollback(String),
}

#[derive(Debug, Default)]
struct Cluster {
    objects: HashSet<ObjectKey>,
    comments: HashMap<ObjectKey, String>,
    events: Vec<Event>,
    fail_begin: bool,
    fail_execute: bool,
    fail_commit: bool,
}

#[derive(Clone)]
pub struct FakeClient {
    cluster: Arc<Mutex<Cluster>>,
    default_database: String,
    version: ServerVersion,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::with_version(ServerVersion::from_num(160002))
    }

    pub fn with_version(version: ServerVersion) -> Self {
        Self {
            cluster: Arc::new(Mutex::new(Cluster::default())),
            default_database: "postgres".to_string(),
            version,
        }
    }

    /// Create an object that comments can be attached to
    pub fn add_object(&self, object_type: ObjectType, database: &str, name: &str) {
        let key = object_key(object_type, database, name);
        self.cluster.lock().unwrap().objects.insert(key);
    }

    /// Change a comment behind the controller's back
    pub fn set_comment_out_of_band(
        &self,
        object_type: ObjectType,
        database: &str,
        name: &str,
        comment: &str,
    ) {
        let key = object_key(object_type, database, name);
        let mut cluster = self.cluster.lock().unwrap();
        if comment.is_empty() {
            cluster.comments.remove(&key);
        } else {
            cluster.comments.insert(key, comment.to_string());
        }
    }

    pub fn stored_comment(&self, object_type: ObjectType, database: &str, name: &str) -> Option<String> {
        let key = object_key(object_type, database, name);
        self.cluster.lock().unwrap().comments.get(&key).cloned()
    }

    pub fn events(&self) -> Vec<Event> {
        self.cluster.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.cluster.lock().unwrap().events.clear();
    }

    pub fn fail_begin(&self, fail: bool) {
        self.cluster.lock().unwrap().fail_begin = fail;
    }

    pub fn fail_execute(&self, fail: bool) {
        self.cluster.lock().unwrap().fail_execute = fail;
    }

    pub fn fail_commit(&self, fail: bool) {
        self.cluster.lock().unwrap().fail_commit = fail;
    }

    /// Every Begin is matched by exactly one Commit or Rollback
    pub fn assert_no_open_transactions(&self) {
        let events = self.events();
        let begins = events.iter().filter(|e| matches!(e, Event::Begin(_))).count();
        let ends = events
            .iter()
            .filter(|e| matches!(e, Event::Commit(_) | Event::Rollback(_)))
            .count();
        assert_eq!(begins, ends, "unbalanced transactions: {:?}", events);
    }
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

fn object_key(object_type: ObjectType, database: &str, name: &str) -> ObjectKey {
    let scope = if object_type.is_database_scoped() {
        database.to_string()
    } else {
        String::new()
    };
    (object_type, scope, name.to_string())
}

impl FeatureGate for FakeClient {
    fn server_version(&self) -> ServerVersion {
        self.version
    }
}

#[async_trait]
impl ConnectionProvider for FakeClient {
    fn default_database(&self) -> &str {
        &self.default_database
    }

    async fn begin(&self, database: &str) -> Result<Box<dyn CommentTransaction>, CommentError> {
        let mut cluster = self.cluster.lock().unwrap();
        if cluster.fail_begin {
            return Err(CommentError::Transaction {
                database: database.to_string(),
                source: sqlx::Error::PoolTimedOut,
            });
        }
        cluster.events.push(Event::Begin(database.to_string()));

        Ok(Box::new(FakeTransaction {
            cluster: Arc::clone(&self.cluster),
            database: database.to_string(),
            pending: Vec::new(),
        }))
    }
}

struct FakeTransaction {
    cluster: Arc<Mutex<Cluster>>,
    database: String,
    pending: Vec<(ObjectKey, String)>,
}

#[async_trait]
impl CommentTransaction for FakeTransaction {
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        let mut cluster = self.cluster.lock().unwrap();
        cluster
            .events
            .push(Event::Execute(self.database.clone(), sql.to_string()));
        if cluster.fail_execute {
            return Err(sqlx::Error::Protocol("permission denied".to_string()));
        }

        let (object_type, name, comment) = parse_comment_statement(sql)
            .ok_or_else(|| sqlx::Error::Protocol(format!("syntax error in {}", sql)))?;
        let key = object_key(object_type, &self.database, &name);
        if !cluster.objects.contains(&key) {
            return Err(sqlx::Error::Protocol(format!(
                "{} \"{}\" does not exist",
                object_type, name
            )));
        }

        self.pending.push((key, comment));
        Ok(())
    }

    async fn fetch_description(
        &mut self,
        query: &str,
        object_name: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let mut cluster = self.cluster.lock().unwrap();
        cluster
            .events
            .push(Event::Lookup(self.database.clone(), object_name.to_string()));

        let object_type = ObjectType::ALL
            .into_iter()
            .find(|t| lookup_query(*t) == query)
            .ok_or_else(|| sqlx::Error::Protocol(format!("unexpected query {}", query)))?;
        let key = object_key(object_type, &self.database, object_name);

        // Uncommitted writes are visible inside the same transaction
        if let Some((_, comment)) = self.pending.iter().rev().find(|(k, _)| *k == key) {
            return Ok(Some(comment.clone()).filter(|c| !c.is_empty()));
        }
        Ok(cluster.comments.get(&key).cloned())
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        let mut cluster = self.cluster.lock().unwrap();
        if cluster.fail_commit {
            // A failed COMMIT leaves the transaction aborted
            cluster.events.push(Event::Rollback(self.database.clone()));
            return Err(sqlx::Error::Protocol("could not serialize access".to_string()));
        }
        for (key, comment) in &self.pending {
            if comment.is_empty() {
                cluster.comments.remove(key);
            } else {
                cluster.comments.insert(key.clone(), comment.clone());
            }
        }
        cluster.events.push(Event::Commit(self.database.clone()));
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        let mut cluster = self.cluster.lock().unwrap();
        cluster.events.push(Event::Rollback(self.database.clone()));
    }
}

/// Parse `COMMENT ON <KEYWORD> "<ident>" IS '<literal>'` as rendered by the translator
pub fn parse_comment_statement(sql: &str) -> Option<(ObjectType, String, String)> {
    let rest = sql.strip_prefix("COMMENT ON ")?;
    let (keyword, rest) = rest.split_once(' ')?;
    let object_type = ObjectType::ALL
        .into_iter()
        .find(|t| t.sql_keyword() == keyword)?;

    let (name, rest) = parse_quoted(rest, '"')?;
    let rest = rest.strip_prefix(" IS ")?;

    let (comment, rest) = match rest.strip_prefix('E') {
        Some(escaped) => {
            let (raw, rest) = parse_quoted(escaped, '\'')?;
            (raw.replace("\\\\", "\\"), rest)
        }
        None => parse_quoted(rest, '\'')?,
    };
    if !rest.is_empty() {
        return None;
    }

    Some((object_type, name, comment))
}

/// Read a quoted token where the quote character is escaped by doubling it
fn parse_quoted(input: &str, quote: char) -> Option<(String, &str)> {
    let body = input.strip_prefix(quote)?;
    let mut value = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c == quote {
            if let Some((_, next)) = chars.peek()
                && *next == quote
            {
                value.push(quote);
                chars.next();
                continue;
            }
            return Some((value, &body[idx + c.len_utf8()..]));
        }
        value.push(c);
    }

    None
}
