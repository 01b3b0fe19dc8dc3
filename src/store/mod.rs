//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了商铺实体与持久层访问接口。

pub mod db;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use db::SeaOrmShopStore;

/// 商铺记录
///
/// 对应持久层 `tb_shop` 表。写路径允许id缺失，
/// 由服务层在任何副作用之前拒绝
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    /// 主键，写路径校验非空
    pub id: Option<i64>,
    /// 商铺名称
    pub name: String,
    /// 商铺类型id
    pub type_id: i64,
    /// 商铺图片，多个以','隔开
    pub images: String,
    /// 商圈
    pub area: Option<String>,
    /// 地址
    pub address: String,
    /// 经度
    pub x: f64,
    /// 纬度
    pub y: f64,
    /// 均价（整数）
    pub avg_price: Option<i64>,
    /// 销量
    pub sold: i32,
    /// 评论数量
    pub comments: i32,
    /// 评分（乘10保存）
    pub score: i32,
    /// 营业时间
    pub open_hours: Option<String>,
    /// 创建时间
    pub create_time: Option<NaiveDateTime>,
    /// 更新时间
    pub update_time: Option<NaiveDateTime>,
}

/// 持久层访问接口
///
/// 读穿缓存核心只依赖按键查询与按键更新两个操作，
/// 存储被视为唯一事实来源，读路径永不修改它
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// 按id查询商铺，不存在返回None
    ///
    /// "记录不存在"与"记录存在"必须可区分，
    /// 空值缓存依赖这一点
    async fn find_by_id(&self, id: i64) -> Result<Option<Shop>>;

    /// 按id更新商铺
    ///
    /// 对记录自身字段保持事务性；调用方保证id非空
    async fn update_by_id(&self, shop: &Shop) -> Result<()>;
}
