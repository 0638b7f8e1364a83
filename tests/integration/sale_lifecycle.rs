//! Sale lifecycle integration tests
//!
//! Walks a deployed sale through initial distribution, SAFT and TGE
//! purchases, refunds, finishing and every vesting release rule.

use super::sale_fixtures::*;
use crowdsale_sdk::config::{MONTH_SECS, PRICE_UNIT};
use crowdsale_sdk::{BeneficiaryClass, Error, SaleEvent, SaleStage, Stage, Uint128};

// ========== Deployment ==========

#[test]
fn test_initial_distribution() {
    let fixture = SaleFixture::deploy();
    let ledger = &fixture.ledger;

    assert_eq!(ledger.token_cap(), tokens(CAP_TOKENS));
    assert_eq!(ledger.locked_balance_of(&addr(ECOSYSTEM_ADDR)), tokens(225_000_000));
    assert_eq!(ledger.locked_balance_of(&addr(RESERVE_ADDR)), tokens(450_000_000));
    assert_eq!(ledger.locked_balance_of(&addr(TEAM_ADDR)), tokens(195_000_000));
    assert_eq!(ledger.locked_balance_of(&addr(ADVISOR_1_ADDR)), tokens(52_500_000));
    assert_eq!(ledger.locked_balance_of(&addr(ADVISOR_2_ADDR)), tokens(52_500_000));

    assert_eq!(ledger.tokens_allocated(), tokens(975_000_000));
    assert_eq!(ledger.tokens_sold(), Uint128::zero());
    assert_eq!(ledger.stage(), Stage::Investment);
    assert_eq!(ledger.sale_stage(), SaleStage::Saft);
    assert_eq!(ledger.sale_stage_price_usd(), 31_250);
    assert_eq!(ledger.started_time(), START);
    assert_eq!(ledger.treasury(), &addr(WALLET_ADDR));
    assert!(ledger.is_admin(&addr(OWNER_ADDR)));
    assert!(ledger.is_admin(&addr(ADMIN_ADDR)));
    assert!(!ledger.is_admin(&addr(INVESTOR_ADDR)));
    fixture.assert_consistent();
}

#[test]
fn test_late_admins_can_operate() {
    let mut fixture = SaleFixture::deploy();
    let owner = fixture.owner();
    let late = addr(REFERRER_ADDR);

    assert!(matches!(
        fixture.ledger.add_address_to_whitelist(&late, addr(INVESTOR_ADDR)),
        Err(Error::Unauthorized(_))
    ));
    fixture
        .ledger
        .add_addresses_to_admins(&owner, vec![late.clone()])
        .unwrap();
    fixture
        .ledger
        .add_address_to_whitelist(&late, addr(INVESTOR_ADDR))
        .unwrap();
    assert!(fixture.ledger.is_whitelisted(&addr(INVESTOR_ADDR)));
}

// ========== Pool release rules ==========

#[test]
fn test_pool_release_rules_at_start() {
    let mut fixture = SaleFixture::deploy();
    let caller = addr(OUTSIDER_ADDR);

    let released = fixture
        .ledger
        .release_tokens_for(&caller, &addr(ECOSYSTEM_ADDR))
        .unwrap();
    assert_eq!(released, tokens(225_000_000));
    assert_eq!(fixture.token.balance_of(&addr(ECOSYSTEM_ADDR)), tokens(225_000_000));

    for pool in [RESERVE_ADDR, TEAM_ADDR, ADVISOR_1_ADDR] {
        let err = fixture
            .ledger
            .release_tokens_for(&caller, &addr(pool))
            .unwrap_err();
        assert!(matches!(err, Error::NothingToRelease(_)), "{}: {:?}", pool, err);
    }
    assert_eq!(fixture.ledger.total_released(), tokens(225_000_000));
    fixture.assert_consistent();
}

#[test]
fn test_advisor_two_step_release() {
    let mut fixture = SaleFixture::deploy();
    let caller = addr(OUTSIDER_ADDR);
    let advisor = addr(ADVISOR_1_ADDR);

    fixture.clock.advance(3 * MONTH_SECS);
    let first = fixture.ledger.release_tokens_for(&caller, &advisor).unwrap();
    assert_eq!(first, tokens(26_250_000));

    let err = fixture.ledger.release_tokens_for(&caller, &advisor).unwrap_err();
    assert!(matches!(err, Error::NothingToRelease(_)));

    fixture.clock.advance(3 * MONTH_SECS);
    let second = fixture.ledger.release_tokens_for(&caller, &advisor).unwrap();
    assert_eq!(second, tokens(26_250_000));
    assert_eq!(fixture.token.balance_of(&advisor), tokens(52_500_000));
    assert_eq!(fixture.ledger.locked_balance_of(&advisor), Uint128::zero());
    assert_eq!(fixture.ledger.released_of(&advisor), tokens(52_500_000));
    fixture.assert_consistent();
}

// ========== Purchases ==========

#[test]
fn test_whitelist_is_required() {
    let mut fixture = SaleFixture::deploy();
    let investor = addr(INVESTOR_ADDR);

    let err = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(1_000))
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert_eq!(fixture.treasury.balance(), Uint128::zero());
    assert_eq!(fixture.ledger.wei_raised(), Uint128::zero());
}

#[test]
fn test_buy_with_referral_and_invest_on_behalf() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    let investor = addr(INVESTOR_ADDR);
    let referrer = addr(REFERRER_ADDR);
    let admin = addr(ADMIN_ADDR);

    let bought = fixture
        .ledger
        .buy_tokens(&investor, &investor, Some(&referrer), wei_for_usd(10_000))
        .unwrap();
    assert_eq!(bought, tokens(320_000));
    assert_eq!(fixture.ledger.locked_balance_of(&referrer), tokens(16_000));
    assert_eq!(fixture.ledger.tokens_sold(), tokens(336_000));

    // Admin allocations need no whitelist entry on the beneficiary
    let other = addr(OUTSIDER_ADDR);
    fixture
        .ledger
        .invest_on_behalf_of(&admin, &other, tokens(1_000), Some(&referrer))
        .unwrap();
    assert_eq!(fixture.ledger.locked_balance_of(&other), tokens(1_000));
    assert_eq!(fixture.ledger.locked_balance_of(&referrer), tokens(16_050));
    assert_eq!(fixture.ledger.class_of(&other), Some(BeneficiaryClass::Investor));
    assert_eq!(fixture.ledger.tokens_sold(), tokens(337_050));
    assert_eq!(fixture.ledger.wei_raised(), wei_for_usd(10_000));
    assert_eq!(fixture.treasury.received_from(&investor), wei_for_usd(10_000));
    fixture.assert_consistent();
}

#[test]
fn test_saft_tiers_follow_contribution_size() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    let investor = addr(INVESTOR_ADDR);

    let small = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(10_000))
        .unwrap();
    assert_eq!(small, tokens(320_000));

    let medium = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(100_000))
        .unwrap();
    assert_eq!(medium, Uint128::new(100_000 * UNIT * PRICE_UNIT / 27_500));

    let large = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(500_000))
        .unwrap();
    assert_eq!(large, Uint128::new(500_000 * UNIT * PRICE_UNIT / 22_500));

    assert_eq!(fixture.ledger.locked_balance_of(&investor), small + medium + large);
    assert_eq!(fixture.treasury.balance(), wei_for_usd(610_000));
}

#[test]
fn test_quote_matches_purchase() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    let investor = addr(INVESTOR_ADDR);
    let value = Uint128::new(UNIT / 3);

    let quoted = fixture.ledger.get_token_amount(value).unwrap();
    let bought = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, value)
        .unwrap();
    assert_eq!(quoted, bought);
}

// ========== SAFT -> TGE ==========

#[test]
fn test_crossing_purchase_is_priced_under_saft() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    let investor = addr(INVESTOR_ADDR);
    fixture.sell_up_to(tokens(149_990_000));
    assert_eq!(fixture.ledger.sale_stage(), SaleStage::Saft);

    let bought = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(10_000))
        .unwrap();
    assert_eq!(bought, tokens(320_000));
    assert_eq!(fixture.ledger.sale_stage(), SaleStage::Tge);
    assert_eq!(fixture.ledger.sale_stage_price_usd(), 32_500);

    let events = fixture.ledger.drain_events();
    assert!(events.contains(&SaleEvent::SaleStageChanged {
        from: SaleStage::Saft,
        to: SaleStage::Tge,
    }));

    // $50k now gets the TGE volume discount
    let discounted = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(50_000))
        .unwrap();
    assert_eq!(
        discounted,
        Uint128::new(50_000 * UNIT * PRICE_UNIT * 100 / (32_500 * 95))
    );
}

#[test]
fn test_tge_price_steps() {
    let mut fixture = SaleFixture::deploy();
    fixture.sell_up_to(tokens(150_000_000));
    assert_eq!(fixture.ledger.sale_stage(), SaleStage::Tge);
    assert_eq!(fixture.ledger.sale_stage_price_usd(), 32_500);

    fixture.sell_up_to(tokens(225_000_000));
    assert_eq!(fixture.ledger.sale_stage_price_usd(), 40_000);

    fixture.sell_up_to(tokens(318_750_000));
    assert_eq!(fixture.ledger.sale_stage_price_usd(), 45_000);

    fixture.sell_up_to(tokens(365_625_000));
    assert_eq!(fixture.ledger.sale_stage_price_usd(), 47_500);
    assert_eq!(fixture.ledger.price_step(), 3);
    fixture.assert_consistent();
}

#[test]
fn test_price_step_advances_once_per_purchase() {
    let mut fixture = SaleFixture::deploy();
    fixture.sell_up_to(tokens(150_000_000));
    fixture.sell_up_to(tokens(400_000_000));
    assert_eq!(fixture.ledger.price_step(), 1);

    fixture.sell_up_to(tokens(400_000_001));
    assert_eq!(fixture.ledger.price_step(), 2);
    fixture.sell_up_to(tokens(400_000_002));
    assert_eq!(fixture.ledger.price_step(), 3);
    fixture.sell_up_to(tokens(400_000_003));
    assert_eq!(fixture.ledger.price_step(), 3);
}

#[test]
fn test_steps_wait_for_tge_at_purchase_start() {
    let mut fixture = SaleFixture::deploy();
    fixture.sell_up_to(tokens(300_000_000));
    assert_eq!(fixture.ledger.sale_stage(), SaleStage::Tge);
    assert_eq!(fixture.ledger.price_step(), 0);

    fixture.sell_up_to(tokens(300_000_001));
    assert_eq!(fixture.ledger.price_step(), 1);
    fixture.sell_up_to(tokens(300_000_002));
    assert_eq!(fixture.ledger.price_step(), 1);
}

// ========== Cap and finish ==========

#[test]
fn test_reaching_the_cap_finishes_the_sale() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    let investor = addr(INVESTOR_ADDR);
    let owner = fixture.owner();

    let err = fixture
        .ledger
        .invest_on_behalf_of(&owner, &investor, tokens(525_000_001), None)
        .unwrap_err();
    assert!(matches!(err, Error::CapExceeded { .. }));

    fixture.sell_up_to(tokens(525_000_000));
    assert_eq!(fixture.ledger.stage(), Stage::Finished);
    assert_eq!(fixture.ledger.ended_time(), Some(START));
    assert_eq!(fixture.ledger.tokens_allocated(), tokens(CAP_TOKENS));

    let err = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(100))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidStage(_)));
    let err = fixture.ledger.finish(&owner).unwrap_err();
    assert!(matches!(err, Error::InvalidStage(_)));
    fixture.assert_consistent();
}

#[test]
fn test_finish_moves_unsold_tokens_to_reserve() {
    let mut fixture = SaleFixture::deploy();
    let owner = fixture.owner();
    fixture.sell_up_to(tokens(25_000_000));

    let err = fixture.ledger.finish(&owner).unwrap_err();
    assert!(matches!(err, Error::TimeGateNotReached(_)));
    let err = fixture.ledger.finish(&addr(INVESTOR_ADDR)).unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    fixture.clock.advance(3 * MONTH_SECS);
    let unsold = fixture.ledger.finish(&owner).unwrap();
    let ended = START + 3 * MONTH_SECS;

    assert_eq!(unsold, tokens(500_000_000));
    assert_eq!(
        fixture.ledger.locked_balance_of(&addr(RESERVE_ADDR)),
        tokens(950_000_000)
    );
    assert_eq!(fixture.ledger.ended_time(), Some(ended));
    assert_eq!(fixture.ledger.tokens_allocated(), tokens(CAP_TOKENS));
    assert_eq!(fixture.ledger.tokens_sold(), tokens(25_000_000));
    fixture.assert_consistent();

    // Reserve and team unlock six months after the end
    let caller = addr(OUTSIDER_ADDR);
    fixture.clock.travel_to(ended + 6 * MONTH_SECS - 1);
    for pool in [RESERVE_ADDR, TEAM_ADDR] {
        let err = fixture.ledger.release_tokens_for(&caller, &addr(pool)).unwrap_err();
        assert!(matches!(err, Error::NothingToRelease(_)));
    }

    fixture.clock.advance(1);
    let reserve = fixture
        .ledger
        .release_tokens_for(&caller, &addr(RESERVE_ADDR))
        .unwrap();
    assert_eq!(reserve, tokens(950_000_000));
    let team = fixture
        .ledger
        .release_tokens_for(&caller, &addr(TEAM_ADDR))
        .unwrap();
    assert_eq!(team, tokens(195_000_000));
    fixture.assert_consistent();
}

// ========== Refund ==========

#[test]
fn test_refund_reverses_the_purchase() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    let investor = addr(INVESTOR_ADDR);
    let admin = addr(ADMIN_ADDR);

    let before = fixture.ledger.audit();
    let bought = fixture
        .ledger
        .buy_tokens(&investor, &investor, None, wei_for_usd(1_000))
        .unwrap();

    let err = fixture.ledger.refund(&investor, &investor).unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    let refunded = fixture.ledger.refund(&admin, &investor).unwrap();
    assert_eq!(refunded, bought);
    assert_eq!(fixture.ledger.locked_balance_of(&investor), Uint128::zero());

    let after = fixture.ledger.audit();
    assert_eq!(after.tokens_sold, before.tokens_sold);
    assert_eq!(after.tokens_allocated, before.tokens_allocated);
    assert!(after.is_consistent());

    // Contribution value stays with the treasury
    assert_eq!(fixture.ledger.wei_raised(), wei_for_usd(1_000));

    let err = fixture.ledger.refund(&admin, &investor).unwrap_err();
    assert!(matches!(err, Error::NothingToRefund(_)));
    let err = fixture.ledger.refund(&admin, &addr(RESERVE_ADDR)).unwrap_err();
    assert!(matches!(err, Error::NothingToRefund(_)));
}

// ========== Investor release and token burn ==========

#[test]
fn test_investor_and_referrer_release() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    let investor = addr(INVESTOR_ADDR);
    let referrer = addr(REFERRER_ADDR);
    fixture
        .ledger
        .buy_tokens(&investor, &investor, Some(&referrer), wei_for_usd(10_000))
        .unwrap();

    fixture.clock.advance(6 * MONTH_SECS - 1);
    assert_eq!(fixture.ledger.releasable_now(&investor), Uint128::zero());
    let err = fixture
        .ledger
        .release_tokens_for(&investor, &investor)
        .unwrap_err();
    assert!(matches!(err, Error::NothingToRelease(_)));

    fixture.clock.advance(1);
    assert_eq!(fixture.ledger.releasable_now(&investor), tokens(320_000));
    fixture.ledger.release_tokens_for(&investor, &investor).unwrap();
    fixture.ledger.release_tokens_for(&investor, &referrer).unwrap();

    assert_eq!(fixture.token.balance_of(&investor), tokens(320_000));
    assert_eq!(fixture.token.balance_of(&referrer), tokens(16_000));
    assert_eq!(fixture.token.total_supply(), fixture.ledger.total_released());
    fixture.assert_consistent();
}

#[test]
fn test_released_tokens_can_be_burned_with_allowance() {
    let mut fixture = SaleFixture::deploy();
    let owner = fixture.owner();
    let ecosystem = addr(ECOSYSTEM_ADDR);
    fixture.ledger.release_tokens_for(&owner, &ecosystem).unwrap();

    let err = fixture.token.burn(&ecosystem, tokens(1_000)).unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    fixture.token.add_manager(owner.clone()).unwrap();
    fixture
        .token
        .set_burn_allowance(&owner, &ecosystem, tokens(1_000))
        .unwrap();
    fixture.token.burn(&ecosystem, tokens(1_000)).unwrap();

    assert_eq!(fixture.token.balance_of(&ecosystem), tokens(224_999_000));
    assert_eq!(fixture.token.burn_allowance_of(&ecosystem), Uint128::zero());
    assert!(fixture.token.burn(&ecosystem, tokens(1)).is_err());
}

#[test]
fn test_treasury_receives_every_contribution() {
    let mut fixture = SaleFixture::deploy();
    fixture.whitelist(INVESTOR_ADDR);
    fixture.whitelist(REFERRER_ADDR);
    let investor = addr(INVESTOR_ADDR);
    let second = addr(REFERRER_ADDR);

    for usd in [100, 2_500, 40_000] {
        fixture
            .ledger
            .buy_tokens(&investor, &investor, None, wei_for_usd(usd))
            .unwrap();
    }
    // A purchase paid by one address for another beneficiary
    fixture
        .ledger
        .buy_tokens(&investor, &second, None, wei_for_usd(1_000))
        .unwrap();

    assert_eq!(fixture.treasury.balance(), fixture.ledger.wei_raised());
    assert_eq!(fixture.treasury.received_from(&investor), wei_for_usd(43_600));
    assert_eq!(fixture.ledger.info().wei_raised, wei_for_usd(43_600));
}
