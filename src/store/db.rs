//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了基于Sea-ORM的商铺持久层实现。

use super::{Shop, ShopStore};
use crate::config::DatabaseConfig;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, EntityTrait};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

/// `tb_shop` 表实体定义
pub mod shop_entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "tb_shop")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub type_id: i64,
        pub images: String,
        pub area: Option<String>,
        pub address: String,
        pub x: f64,
        pub y: f64,
        pub avg_price: Option<i64>,
        pub sold: i32,
        pub comments: i32,
        pub score: i32,
        pub open_hours: Option<String>,
        pub create_time: Option<DateTime>,
        pub update_time: Option<DateTime>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<shop_entity::Model> for Shop {
    fn from(model: shop_entity::Model) -> Self {
        Shop {
            id: Some(model.id),
            name: model.name,
            type_id: model.type_id,
            images: model.images,
            area: model.area,
            address: model.address,
            x: model.x,
            y: model.y,
            avg_price: model.avg_price,
            sold: model.sold,
            comments: model.comments,
            score: model.score,
            open_hours: model.open_hours,
            create_time: model.create_time,
            update_time: model.update_time,
        }
    }
}

fn to_active_model(shop: &Shop, id: i64) -> shop_entity::ActiveModel {
    shop_entity::ActiveModel {
        id: Set(id),
        name: Set(shop.name.clone()),
        type_id: Set(shop.type_id),
        images: Set(shop.images.clone()),
        area: Set(shop.area.clone()),
        address: Set(shop.address.clone()),
        x: Set(shop.x),
        y: Set(shop.y),
        avg_price: Set(shop.avg_price),
        sold: Set(shop.sold),
        comments: Set(shop.comments),
        score: Set(shop.score),
        open_hours: Set(shop.open_hours.clone()),
        create_time: Set(shop.create_time),
        update_time: Set(shop.update_time),
    }
}

/// 基于Sea-ORM的商铺持久层实现
///
/// 支持sqlite/mysql/postgres，由连接字符串决定
pub struct SeaOrmShopStore {
    db: DatabaseConnection,
}

impl SeaOrmShopStore {
    /// 连接数据库并创建存储实例
    #[instrument(skip(config), level = "info", name = "init_shop_store")]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db = Database::connect(config.url.expose_secret()).await?;
        Ok(Self { db })
    }

    /// 使用已有连接创建存储实例
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShopStore for SeaOrmShopStore {
    #[instrument(skip(self), level = "debug")]
    async fn find_by_id(&self, id: i64) -> Result<Option<Shop>> {
        let model = shop_entity::Entity::find_by_id(id).one(&self.db).await?;
        debug!("Store lookup: id={}, found={}", id, model.is_some());
        Ok(model.map(Shop::from))
    }

    #[instrument(skip(self, shop), level = "debug")]
    async fn update_by_id(&self, shop: &Shop) -> Result<()> {
        let id = shop
            .id
            .ok_or_else(|| CacheError::InvalidInput("shop id is required".to_string()))?;
        let active = to_active_model(shop, id);
        active.update(&self.db).await?;
        Ok(())
    }
}
