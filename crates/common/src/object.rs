use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    QueueManager,
    Channel,
    Queue,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueueManager => "queue-manager",
            Self::Channel => "channel",
            Self::Queue => "queue",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one monitored object: which server and queue manager it was
/// observed on, plus its own name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    pub server: String,
    pub qmgr: String,
    pub kind: ObjectKind,
    pub name: String,
}

impl ObjectId {
    pub fn new(server: &str, qmgr: &str, kind: ObjectKind, name: &str) -> Self {
        Self {
            server: server.to_string(),
            qmgr: qmgr.to_string(),
            kind,
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}:{}", self.server, self.qmgr, self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_path_like() {
        let id = ObjectId::new("prod-mq-01", "QM1", ObjectKind::Queue, "APP.ORDERS");
        assert_eq!(id.to_string(), "prod-mq-01/QM1/queue:APP.ORDERS");
    }
}
