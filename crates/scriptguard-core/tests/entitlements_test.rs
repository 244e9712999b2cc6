//! Plan entitlement tests: costs, level gating, retention, key limits.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use scriptguard_core::entitlements::plans::{
    allowed_levels, initial_credits, max_active_keys, retention_hours,
};
use scriptguard_core::entitlements::{
    authorize, check_credits, check_level, credit_cost, expiration_for, permanent_expiration,
    plan_catalog, OperationKind,
};
use scriptguard_core::{PlanTier, PolicyError, Profile, ProtectionLevel};

fn profile(plan: PlanTier, credits: u32) -> Profile {
    let now = Utc::now();
    Profile {
        id: "user-1".to_string(),
        name: "Ada".to_string(),
        company_name: "Engines".to_string(),
        age: 30,
        credits,
        plan,
        name_change_used: false,
        theme_preference: None,
        created_at: now,
        updated_at: now,
    }
}

fn plan_strategy() -> impl Strategy<Value = PlanTier> {
    prop::sample::select(PlanTier::ALL.to_vec())
}

fn level_strategy() -> impl Strategy<Value = ProtectionLevel> {
    prop::sample::select(vec![
        ProtectionLevel::Standard,
        ProtectionLevel::Advanced,
        ProtectionLevel::Undetectable,
    ])
}

fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2090-01-01
    (946_684_800i64..3_786_912_000i64).prop_map(|s| Utc.timestamp_opt(s, 0).unwrap())
}

// =============================================================================
// Costs
// =============================================================================

#[test]
fn encrypt_costs_four_and_analyze_two_for_paying_plans() {
    for plan in [PlanTier::Trial, PlanTier::Basic, PlanTier::Pro] {
        assert_eq!(credit_cost(plan, OperationKind::Encrypt), 4, "{plan}");
        assert_eq!(credit_cost(plan, OperationKind::Analyze), 2, "{plan}");
    }
}

#[test]
fn infinite_plan_is_never_charged() {
    assert_eq!(credit_cost(PlanTier::Infinite, OperationKind::Encrypt), 0);
    assert_eq!(credit_cost(PlanTier::Infinite, OperationKind::Analyze), 0);
    let charge = authorize(&profile(PlanTier::Infinite, 0), OperationKind::Encrypt, None).unwrap();
    assert_eq!(charge.cost, 0);
    assert!(!charge.debits_balance);
}

#[test]
fn credits_exactly_equal_to_cost_are_sufficient() {
    assert!(check_credits(&profile(PlanTier::Trial, 4), 4).is_ok());
    assert_eq!(
        check_credits(&profile(PlanTier::Trial, 3), 4),
        Err(PolicyError::InsufficientCredits {
            required: 4,
            available: 3
        })
    );
}

// =============================================================================
// Levels
// =============================================================================

#[test]
fn only_infinite_may_request_non_standard_levels() {
    for plan in [PlanTier::Trial, PlanTier::Basic, PlanTier::Pro] {
        assert!(check_level(plan, ProtectionLevel::Standard).is_ok());
        assert!(check_level(plan, ProtectionLevel::Advanced).is_err());
        assert!(check_level(plan, ProtectionLevel::Undetectable).is_err());
        assert_eq!(allowed_levels(plan), vec![ProtectionLevel::Standard]);
    }
    assert!(check_level(PlanTier::Infinite, ProtectionLevel::Undetectable).is_ok());
    assert_eq!(allowed_levels(PlanTier::Infinite).len(), 3);
}

#[test]
fn level_is_checked_before_credits() {
    let broke = profile(PlanTier::Pro, 0);
    let err = authorize(&broke, OperationKind::Encrypt, Some(ProtectionLevel::Advanced)).unwrap_err();
    assert!(matches!(err, PolicyError::LevelNotPermitted { .. }));
}

// =============================================================================
// Retention and limits
// =============================================================================

#[test]
fn retention_windows_per_plan() {
    let created = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
    assert_eq!(
        expiration_for(PlanTier::Trial, created),
        created + Duration::hours(24)
    );
    assert_eq!(
        expiration_for(PlanTier::Basic, created),
        created + Duration::hours(72)
    );
    assert_eq!(expiration_for(PlanTier::Pro, created), permanent_expiration());
    assert_eq!(
        expiration_for(PlanTier::Infinite, created),
        permanent_expiration()
    );
    assert_eq!(
        permanent_expiration(),
        Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0).unwrap()
    );
}

#[test]
fn key_limits_and_initial_grants() {
    assert_eq!(max_active_keys(PlanTier::Trial), Some(1));
    assert_eq!(max_active_keys(PlanTier::Basic), Some(10));
    assert_eq!(max_active_keys(PlanTier::Pro), Some(10));
    assert_eq!(max_active_keys(PlanTier::Infinite), None);

    assert_eq!(initial_credits(PlanTier::Trial), Some(10));
    assert_eq!(initial_credits(PlanTier::Basic), Some(40));
    assert_eq!(initial_credits(PlanTier::Pro), Some(40));
    assert_eq!(initial_credits(PlanTier::Infinite), None);

    assert_eq!(retention_hours(PlanTier::Pro), None);
}

#[test]
fn catalog_serializes_camel_case() {
    let json = serde_json::to_value(plan_catalog()).unwrap();
    let trial = &json[0];
    assert_eq!(trial["plan"], "trial");
    assert_eq!(trial["initialCredits"], 10);
    assert_eq!(trial["maxActiveKeys"], 1);
    assert_eq!(trial["retentionHours"], 24);
    assert_eq!(trial["encryptCost"], 4);
    assert_eq!(json[3]["maxActiveKeys"], serde_json::Value::Null);
}

#[test]
fn plan_names_round_trip_through_parse() {
    for plan in PlanTier::ALL {
        assert_eq!(PlanTier::parse(plan.as_str()), Some(plan));
    }
    assert_eq!(PlanTier::parse("enterprise"), None);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn expiration_is_a_pure_function_of_plan_and_creation(
        plan in plan_strategy(),
        created in timestamp_strategy(),
    ) {
        let first = expiration_for(plan, created);
        let second = expiration_for(plan, created);
        prop_assert_eq!(first, second);
        prop_assert!(first > created);
    }

    #[test]
    fn authorize_never_approves_an_unaffordable_charge(
        plan in plan_strategy(),
        credits in 0u32..64,
        analyze in any::<bool>(),
        level in level_strategy(),
    ) {
        let op = if analyze { OperationKind::Analyze } else { OperationKind::Encrypt };
        let p = profile(plan, credits);
        match authorize(&p, op, Some(level)) {
            Ok(charge) => {
                prop_assert!(plan.is_unlimited() || charge.cost <= credits);
                prop_assert!(level.is_baseline() || plan.is_unlimited());
                prop_assert_eq!(charge.debits_balance, !plan.is_unlimited());
            }
            Err(PolicyError::LevelNotPermitted { .. }) => {
                prop_assert!(!level.is_baseline() && !plan.is_unlimited());
            }
            Err(PolicyError::InsufficientCredits { required, available }) => {
                prop_assert!(!plan.is_unlimited());
                prop_assert!(available < required);
            }
        }
    }
}
