use infinium_crypto::Address;
use infinium_registry::{PoolRegistry, RegistryConfig, RegistryError};
use infinium_token::{Amount, TokenLedger};
use std::sync::Arc;

const DAY: i64 = 24 * 60 * 60;

fn addr(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

fn registry_account() -> Address {
    Address::from_bytes([0xEE; 20])
}

async fn setup() -> (Arc<TokenLedger>, PoolRegistry, Address) {
    let funder = addr(1);
    let ledger = Arc::new(TokenLedger::with_genesis(funder, Amount::from_inf(1_000_000)).unwrap());
    let registry = PoolRegistry::new(
        ledger.clone(),
        registry_account(),
        RegistryConfig {
            amount_to_lock: Amount::from_inf(100),
            ..RegistryConfig::default()
        },
    );

    let owner = addr(5);
    ledger
        .transfer(funder, owner, Amount::from_inf(100))
        .await
        .unwrap();
    ledger
        .approve(owner, registry_account(), Amount::from_inf(100))
        .await
        .unwrap();
    (ledger, registry, owner)
}

#[tokio::test]
async fn test_create_pool_locks_collateral() {
    let (ledger, registry, owner) = setup().await;

    let pool_id = registry
        .create_pool(owner, 50, "Test Pool".into(), "127.0.0.1:1234".into(), 1_000)
        .await
        .unwrap();
    assert_eq!(pool_id, 1);

    // collateral moved from the creator into registry custody
    assert_eq!(ledger.balance_of(owner).await, Amount::ZERO);
    assert_eq!(
        ledger.balance_of(registry_account()).await,
        Amount::from_inf(100)
    );
    assert_eq!(
        registry.locked_collateral(owner).await,
        Amount::from_inf(100)
    );
    assert_eq!(registry.pool_id_of(owner).await, Some(1));

    let pool = registry.pool_by_id(1).await.unwrap();
    assert_eq!(pool.owner, owner);
    assert_eq!(pool.fee_bps, 50);
    assert_eq!(pool.name, "Test Pool");
    assert_eq!(pool.url, "127.0.0.1:1234");
    assert_eq!(pool.unfinalized_reward, Amount::ZERO);
}

#[tokio::test]
async fn test_second_pool_rejected_while_active() {
    let (_ledger, registry, owner) = setup().await;
    registry
        .create_pool(owner, 0, "".into(), "".into(), 0)
        .await
        .unwrap();

    let err = registry
        .create_pool(owner, 0, "".into(), "".into(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::PoolAlreadyCreated));
}

#[tokio::test]
async fn test_zero_address_cannot_create_pool() {
    let (_ledger, registry, _owner) = setup().await;
    // The zero address is the closed-pool sentinel and must never own a
    // live pool record.
    let err = registry
        .create_pool(Address::ZERO, 0, "".into(), "".into(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ZeroAddress));
    assert_eq!(registry.pool_id_of(Address::ZERO).await, None);
}

#[tokio::test]
async fn test_fee_cap() {
    let (_ledger, registry, owner) = setup().await;
    let err = registry
        .create_pool(owner, 10_001, "".into(), "".into(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidFee(10_001)));
}

#[tokio::test]
async fn test_update_pool() {
    let (_ledger, registry, owner) = setup().await;
    registry
        .create_pool(owner, 50, "Test Pool".into(), "127.0.0.1:1234".into(), 0)
        .await
        .unwrap();

    registry
        .update_pool(owner, 51, "Test Pool2".into(), "127.0.0.1:4321".into())
        .await
        .unwrap();
    let pool = registry.pool_by_id(1).await.unwrap();
    assert_eq!(pool.fee_bps, 51);
    assert_eq!(pool.name, "Test Pool2");
    assert_eq!(pool.url, "127.0.0.1:4321");

    // only the owner may update
    let err = registry
        .update_pool(addr(9), 1, "".into(), "".into())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::NoActivePool));
}

#[tokio::test]
async fn test_close_then_unlock_after_delay() {
    let (ledger, registry, owner) = setup().await;
    registry
        .create_pool(owner, 50, "Test Pool".into(), "".into(), 1_000)
        .await
        .unwrap();

    // collateral is locked while the pool is active
    let err = registry.unlock_collateral(owner, 1_000).await.unwrap_err();
    assert!(matches!(err, RegistryError::LockNotExpired));

    registry.close_pool(owner, 2_000).await.unwrap();
    let pool = registry.pool_by_id(1).await.unwrap();
    assert_eq!(pool.owner, Address::ZERO);
    assert!(pool.is_closed());
    assert_eq!(pool.last_activity, 2_000);
    assert_eq!(registry.pool_id_of(owner).await, None);

    // strictly before the delay elapses: still locked
    let err = registry
        .unlock_collateral(owner, 2_000 + 7 * DAY - 1)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::LockNotExpired));

    // after the delay: released in full
    let released = registry
        .unlock_collateral(owner, 2_000 + 7 * DAY + 1)
        .await
        .unwrap();
    assert_eq!(released, Amount::from_inf(100));
    assert_eq!(ledger.balance_of(owner).await, Amount::from_inf(100));
    assert_eq!(registry.locked_collateral(owner).await, Amount::ZERO);

    // nothing left to unlock
    let err = registry
        .unlock_collateral(owner, 2_000 + 8 * DAY)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::NothingLocked));
}

#[tokio::test]
async fn test_recreate_after_unlock() {
    let (ledger, registry, owner) = setup().await;
    registry
        .create_pool(owner, 0, "".into(), "".into(), 0)
        .await
        .unwrap();
    registry.close_pool(owner, 100).await.unwrap();

    // collateral still locked blocks a new pool
    let err = registry
        .create_pool(owner, 0, "".into(), "".into(), 200)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::CollateralStillLocked));

    registry.unlock_collateral(owner, 100 + 8 * DAY).await.unwrap();
    ledger
        .approve(owner, registry_account(), Amount::from_inf(100))
        .await
        .unwrap();
    let pool_id = registry
        .create_pool(owner, 0, "".into(), "".into(), 100 + 8 * DAY)
        .await
        .unwrap();
    assert_eq!(pool_id, 2);
}
