//! src/state.rs
//!
//! Application state written by the tools themselves (topics, members,
//! templates, workflow projects). Unlike `config.toml` these files are not
//! meant to be edited by hand, and they are kept as JSON.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::get_config_dir;
use crate::errors::RoundtableError;
use crate::template::Templates;
use crate::workflow::Project;

const DISCUSS_STATE_FILE: &str = "discuss.json";
const WORKFLOW_STATE_FILE: &str = "workflow.json";

/// A participant of a discussion: a label plus an optional working folder.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

impl Member {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// The optional path, `None` when blank.
    pub fn path(&self) -> Option<&str> {
        let path = self.path.trim();
        (!path.is_empty()).then_some(path)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TopicInfo {
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub ai_list: Vec<Member>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DiscussState {
    #[serde(default)]
    pub topics: BTreeMap<String, TopicInfo>,
    #[serde(default)]
    pub last_topic: String,
    #[serde(default)]
    pub templates: Templates,
}

/// A loaded topic: its name, folder and member list.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTopic {
    pub name: String,
    pub folder: PathBuf,
    pub members: Vec<Member>,
}

impl DiscussState {
    /// The topic named by `last_topic`.
    pub fn active_topic(&self) -> Result<ActiveTopic, RoundtableError> {
        let name = self.last_topic.trim();
        if name.is_empty() {
            return Err(RoundtableError::NoActiveTopic);
        }
        self.topic(name)
    }

    pub fn topic(&self, name: &str) -> Result<ActiveTopic, RoundtableError> {
        let info = self
            .topics
            .get(name)
            .ok_or_else(|| RoundtableError::UnknownTopic(name.to_string()))?;
        let folder = crate::paths::normalize_path(&info.folder)
            .ok_or_else(|| RoundtableError::UnknownTopic(name.to_string()))?;
        Ok(ActiveTopic {
            name: name.to_string(),
            folder,
            members: info.ai_list.clone(),
        })
    }

    /// Like `active_topic`, but also requires at least one member.
    pub fn active_topic_with_members(&self) -> Result<ActiveTopic, RoundtableError> {
        let topic = self.active_topic()?;
        if topic.members.is_empty() {
            return Err(RoundtableError::NoMembers(topic.name));
        }
        Ok(topic)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct WorkflowState {
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,
    #[serde(default)]
    pub last_project: String,
}

impl WorkflowState {
    pub fn active_project(&self) -> Result<(&str, &Project), RoundtableError> {
        let name = self.last_project.trim();
        if name.is_empty() {
            return Err(RoundtableError::NoActiveProject);
        }
        self.projects
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| RoundtableError::UnknownProject(name.to_string()))
    }

    pub fn active_project_mut(&mut self) -> Result<(String, &mut Project), RoundtableError> {
        let name = self.last_project.trim().to_string();
        if name.is_empty() {
            return Err(RoundtableError::NoActiveProject);
        }
        match self.projects.get_mut(&name) {
            Some(project) => Ok((name, project)),
            None => Err(RoundtableError::UnknownProject(name)),
        }
    }
}

async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("無法讀取 {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&content).with_context(|| format!("無法解析 {}", path.display()))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    // serde_json 預設不跳脫非 ASCII 字元，中文會原樣寫入
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("無法寫入 {}", path.display()))
}

pub async fn load_discuss_state() -> Result<DiscussState> {
    let path = get_config_dir().await?.join(DISCUSS_STATE_FILE);
    read_json(&path).await
}

pub async fn save_discuss_state(state: &DiscussState) -> Result<()> {
    let path = get_config_dir().await?.join(DISCUSS_STATE_FILE);
    write_json(&path, state).await
}

pub async fn load_workflow_state() -> Result<WorkflowState> {
    let path = get_config_dir().await?.join(WORKFLOW_STATE_FILE);
    read_json(&path).await
}

pub async fn save_workflow_state(state: &WorkflowState) -> Result<()> {
    let path = get_config_dir().await?.join(WORKFLOW_STATE_FILE);
    write_json(&path, state).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_or_blank_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discuss.json");
        let state: DiscussState = read_json(&path).await.unwrap();
        assert_eq!(state, DiscussState::default());

        std::fs::write(&path, "  \n").unwrap();
        let state: DiscussState = read_json(&path).await.unwrap();
        assert!(state.topics.is_empty());
    }

    #[tokio::test]
    async fn chinese_text_is_written_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discuss.json");
        let mut state = DiscussState::default();
        state.topics.insert(
            "新主題".to_string(),
            TopicInfo {
                folder: "/tmp/新主題".to_string(),
                ai_list: vec![Member::new("克勞德", "")],
            },
        );
        state.last_topic = "新主題".to_string();
        write_json(&path, &state).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("新主題"));
        assert!(raw.contains("克勞德"));

        let loaded: DiscussState = read_json(&path).await.unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn active_topic_requires_members() {
        let mut state = DiscussState::default();
        assert!(matches!(
            state.active_topic(),
            Err(RoundtableError::NoActiveTopic)
        ));

        state.topics.insert(
            "t".to_string(),
            TopicInfo {
                folder: "/tmp/t".to_string(),
                ai_list: vec![],
            },
        );
        state.last_topic = "t".to_string();
        assert!(state.active_topic().is_ok());
        assert!(matches!(
            state.active_topic_with_members(),
            Err(RoundtableError::NoMembers(_))
        ));
    }

    #[test]
    fn member_path_is_optional() {
        assert_eq!(Member::new("A", "  ").path(), None);
        assert_eq!(Member::new("A", "/work").path(), Some("/work"));
    }
}
