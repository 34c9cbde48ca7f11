// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 输出数据源记录
///
/// 外部维护的输出目标连接信息，编排器只读。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSinkRecord {
    /// 数据源ID
    pub id: i64,
    /// 数据源名称
    pub name: String,
    /// 主机地址
    pub host: String,
    /// 端口
    pub port: u16,
    /// 用户名
    pub user: String,
    /// 密码
    pub password: String,
    /// 目标库名
    pub db_name: String,
}

impl fmt::Debug for DataSinkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSinkRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("db_name", &self.db_name)
            .finish()
    }
}

/// 输出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// 写入MySQL
    #[default]
    Mysql,
    /// 写入CSV文件
    Csv,
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputType::Mysql => write!(f, "mysql"),
            OutputType::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" => Ok(OutputType::Mysql),
            "csv" => Ok(OutputType::Csv),
            _ => Err(()),
        }
    }
}
