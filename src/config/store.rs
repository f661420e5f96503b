//! 点分键访问的配置存储
//!
//! 所有配置以 `serde_json::Value` 树保存，`app.logger.file` 这样的键
//! 逐级查找对象成员。

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

use super::loader::ConfigLoader;
use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: Value,
}

impl Config {
    /// 创建空配置
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// 由已有的对象构造配置；非对象值被视为空配置
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => Self { root: value },
            _ => Self::new(),
        }
    }

    /// 加载目录中的全部 `*.toml` 文件
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::new(dir.as_ref()).load()
    }

    /// 按点分键查找，空键返回整个配置树
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return Some(&self.root);
        }
        key.split('.')
            .try_fold(&self.root, |node, segment| node.as_object()?.get(segment))
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// 读取字符串值，非字符串视为缺失
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// 反序列化为具体类型，键缺失时返回 `Ok(None)`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// 写入值，按需创建中间对象
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        let slot = self.slot_mut(key)?;
        *slot = value;
        Ok(())
    }

    /// 与已有值深度合并，对象逐键合并，其余类型直接覆盖
    pub fn merge(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        let slot = self.slot_mut(key)?;
        merge_value(slot, value);
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut Value, ConfigError> {
        let mut node = &mut self.root;
        if key.is_empty() {
            return Ok(node);
        }
        for segment in key.split('.') {
            if node.is_null() {
                *node = Value::Object(Map::new());
            }
            let map = node
                .as_object_mut()
                .ok_or_else(|| ConfigError::NotATable(key.to_string()))?;
            node = map.entry(segment.to_string()).or_insert(Value::Null);
        }
        Ok(node)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_value(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                merge_value(existing.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}
