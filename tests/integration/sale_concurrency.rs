//! Concurrent access through the async sale service
//!
//! Operations race on one service; every accepted operation must be applied
//! exactly once and the ledger must stay consistent.

use super::sale_fixtures::*;
use crowdsale_sdk::config::MONTH_SECS;
use crowdsale_sdk::{Error, Uint128};
use futures::future::join_all;

fn investor(i: usize) -> crowdsale_sdk::Addr {
    addr(&format!("0x9{:039x}", i))
}

#[tokio::test]
async fn test_concurrent_purchases_are_all_applied() {
    let (service, _token, treasury, _clock) = sale_service_with(sale_config());
    let owner = addr(OWNER_ADDR);
    for i in 0..20 {
        service.add_address_to_whitelist(&owner, investor(i)).await.unwrap();
    }

    let buyers: Vec<_> = (0..20).map(investor).collect();
    let results = join_all(
        buyers
            .iter()
            .map(|buyer| service.buy_tokens(buyer, buyer, None, wei_for_usd(100))),
    )
    .await;

    // $100 at the first SAFT tier
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), &tokens(3_200));
    }
    let info = service.info();
    assert_eq!(info.tokens_sold, tokens(64_000));
    assert_eq!(info.wei_raised, wei_for_usd(2_000));
    assert_eq!(treasury.balance(), wei_for_usd(2_000));
    assert!(service.audit().await.is_consistent());
}

#[tokio::test]
async fn test_cap_race_accepts_only_what_fits() {
    // 350 tokens left for sale after the 65% initial distribution
    let config = crowdsale_sdk::SaleConfig::builder()
        .token_cap(1_000)
        .eth_usd_rate(ETH_USD_RATE)
        .pools(pool_addresses())
        .build()
        .unwrap();
    let (service, _token, treasury, _clock) = sale_service_with(config);
    let owner = addr(OWNER_ADDR);

    let buyers: Vec<_> = (0..5).map(investor).collect();
    for buyer in &buyers {
        service.add_address_to_whitelist(&owner, buyer.clone()).await.unwrap();
    }

    // 100 tokens at $0.03125
    let value = Uint128::new(7_812_500_000_000_000);
    let handles: Vec<_> = buyers
        .into_iter()
        .map(|buyer| {
            let service = service.clone();
            tokio::spawn(async move { service.buy_tokens(&buyer, &buyer, None, value).await })
        })
        .collect();

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(amount) => {
                assert_eq!(amount, tokens(100));
                accepted += 1;
            }
            Err(Error::CapExceeded { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(rejected, 2);
    assert_eq!(service.info().tokens_sold, tokens(300));
    assert_eq!(treasury.balance(), Uint128::new(3 * 7_812_500_000_000_000));
    assert!(service.audit().await.is_consistent());
}

#[tokio::test]
async fn test_concurrent_releases_pay_out_once() {
    let (service, token, _treasury, clock) = sale_service_with(sale_config());
    let owner = addr(OWNER_ADDR);
    let beneficiary = investor(1);
    service
        .invest_on_behalf_of(&owner, &beneficiary, tokens(5_000), None)
        .await
        .unwrap();
    clock.advance(6 * MONTH_SECS);

    let callers: Vec<_> = (10..15).map(investor).collect();
    let results = join_all(
        callers
            .iter()
            .map(|caller| service.release_tokens_for(caller, &beneficiary)),
    )
    .await;

    let released: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(released, vec![&tokens(5_000)]);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(Error::NothingToRelease(_))))
            .count(),
        4
    );
    assert_eq!(token.balance_of(&beneficiary), tokens(5_000));
    assert_eq!(service.locked_balance_of(&beneficiary).await, Uint128::zero());
    assert_eq!(service.released_of(&beneficiary).await, tokens(5_000));
}

#[test]
fn test_service_queries_from_blocking_context() {
    let (service, _token, _treasury, _clock) = sale_service_with(sale_config());

    let (admin, locked) = tokio_test::block_on(async {
        (
            service.is_admin(&addr(ADMIN_ADDR)).await,
            service.locked_balance_of(&addr(RESERVE_ADDR)).await,
        )
    });
    assert!(admin);
    assert_eq!(locked, tokens(450_000_000));
    assert!(service.info().is_open());
}
