use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use super::setup_test_db;
use crate::{geometry, provider, zone};

/// A rolled back provider+zone write leaves nothing behind.
#[tokio::test]
async fn rollback_discards_provider_and_zone() -> anyhow::Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let txn = db.begin().await?;
    let now = Utc::now().into();
    let p = provider::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("tx provider".into()),
        email: Set("tx@example.com".into()),
        phone: Set("123".into()),
        address: Set("somewhere".into()),
        manager_id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    let z = zone::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("tx zone".into()),
        mpoly: Set(geometry::to_wkt(&geometry::rectangle(10.0, 10.0, 11.0, 11.0))),
        provider_id: Set(p.id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.rollback().await?;

    assert!(provider::Entity::find_by_id(p.id).one(&db).await?.is_none());
    assert!(zone::Entity::find_by_id(z.id).one(&db).await?.is_none());
    Ok(())
}

/// A zone pointing at a missing provider is refused by the FK.
#[tokio::test]
async fn zone_requires_existing_provider() -> anyhow::Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let now = Utc::now().into();
    let res = zone::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("orphan".into()),
        mpoly: Set(geometry::to_wkt(&geometry::rectangle(0.0, 0.0, 1.0, 1.0))),
        provider_id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await;
    assert!(res.is_err());
    Ok(())
}
