use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub views: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReactionsPayload")]
pub struct Reactions {
    pub likes: u64,
    pub dislikes: u64,
}

/// Older payloads carry a bare reaction total instead of a breakdown.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReactionsPayload {
    Breakdown {
        #[serde(default)]
        likes: u64,
        #[serde(default)]
        dislikes: u64,
    },
    Total(u64),
}

impl From<ReactionsPayload> for Reactions {
    fn from(payload: ReactionsPayload) -> Self {
        match payload {
            ReactionsPayload::Breakdown { likes, dislikes } => Self { likes, dislikes },
            ReactionsPayload::Total(likes) => Self { likes, dislikes: 0 },
        }
    }
}

/// Accepts either `{"posts": [...]}` or a bare array of posts.
pub fn normalize_posts(payload: Value) -> Result<Vec<Post>, serde_json::Error> {
    let list = match payload {
        Value::Object(mut map) => match map.remove("posts") {
            Some(posts) => posts,
            None => Value::Object(map),
        },
        other => other,
    };
    serde_json::from_value(list)
}
