//! Unit tests for dossier

use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use dossier_rbac::{PermissionEvaluator, Principal, ProfileOperation, RoleName};
use dossier_store::{MemoryStore, PageRequest, ProfileStore, SortKey, SortOrder, StoreError};
use dossier_types::{NewProfile, Profile, ProfileId, ProfilePatch, User, UserId};
use proptest::prelude::*;
use test_case::test_case;
use uuid::Uuid;

use crate::{PageLimits, ProfileAccessService, ProfileError, SearchCriteria};

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    service: ProfileAccessService<Arc<MemoryStore>>,
    alice: Principal,
    bob: Principal,
    admin: Principal,
}

fn born() -> NaiveDate {
    NaiveDate::from_ymd_opt(1984, 2, 29).unwrap()
}

fn fields(address: &str) -> NewProfile {
    NewProfile::new(address, born()).with_age(40)
}

fn fixture() -> Fixture {
    let alice = User::new(UserId::generate(), "Alice", "Smith", "alice@example.com")
        .with_role("USER");
    let bob = User::new(UserId::generate(), "Bob", "Jones", "bob@example.com")
        .with_role("ROLE_USER");
    let admin = User::new(UserId::generate(), "Ann", "Admin", "admin@example.com")
        .with_role("ROLE_ADMIN")
        .with_role("USER");

    let principal = |u: &User| Principal::from_role_strings(u.id, &u.roles);
    let fixture_principals = (principal(&alice), principal(&bob), principal(&admin));

    let store = Arc::new(
        MemoryStore::new()
            .with_user(alice)
            .with_user(bob)
            .with_user(admin),
    );
    let service = ProfileAccessService::new(store)
        .with_evaluator(PermissionEvaluator::standard().without_audit());

    Fixture {
        service,
        alice: fixture_principals.0,
        bob: fixture_principals.1,
        admin: fixture_principals.2,
    }
}

fn user_only(id: UserId) -> Principal {
    Principal::new(id, [RoleName::User])
}

// ============================================================================
// Create / Own-profile Tests
// ============================================================================

#[test]
fn create_then_get_own() {
    let f = fixture();

    let created = f.service.create(Some(&f.alice), fields("Main St 1")).unwrap();

    assert_eq!(created.owner_id, f.alice.subject_id());
    assert_eq!(f.service.get_own(Some(&f.alice)).unwrap(), created);
    assert!(f.service.has_profile(Some(&f.alice)).unwrap());
    assert!(!f.service.has_profile(Some(&f.bob)).unwrap());
}

#[test]
fn second_create_conflicts() {
    let f = fixture();
    f.service.create(Some(&f.alice), fields("first")).unwrap();

    let second = f.service.create(Some(&f.alice), fields("second"));

    assert_eq!(
        second,
        Err(ProfileError::Conflict {
            owner: f.alice.subject_id()
        })
    );
    assert_eq!(f.service.store().profile_count().unwrap(), 1);
}

#[test]
fn concurrent_creates_for_one_subject_yield_one_profile() {
    let f = fixture();
    let service = Arc::new(f.service);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            let alice = f.alice.clone();
            thread::spawn(move || service.create(Some(&alice), fields(&format!("attempt {i}"))))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(ProfileError::Conflict { .. })))
        .count();

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(service.store().profile_count().unwrap(), 1);
}

#[test]
fn create_for_unknown_user_is_a_storage_error() {
    let f = fixture();
    let stranger = user_only(UserId::generate());

    let result = f.service.create(Some(&stranger), fields("nowhere"));

    assert_eq!(
        result,
        Err(ProfileError::Storage(StoreError::UnknownOwner(
            stranger.subject_id()
        )))
    );
}

#[test]
fn own_operations_without_profile_are_not_found() {
    let f = fixture();

    assert_eq!(
        f.service.get_own(Some(&f.alice)),
        Err(ProfileError::ProfileNotFound)
    );
    assert_eq!(
        f.service
            .update_own(Some(&f.alice), ProfilePatch::empty().address("x")),
        Err(ProfileError::ProfileNotFound)
    );
    assert_eq!(
        f.service.delete_own(Some(&f.alice)),
        Err(ProfileError::ProfileNotFound)
    );
}

#[test]
fn delete_own_removes_profile_and_allows_recreate() {
    let f = fixture();
    f.service.create(Some(&f.alice), fields("old")).unwrap();

    f.service.delete_own(Some(&f.alice)).unwrap();

    assert!(!f.service.has_profile(Some(&f.alice)).unwrap());
    assert!(f.service.create(Some(&f.alice), fields("new")).is_ok());
}

#[test]
fn principal_without_user_role_cannot_manage_own_profile() {
    let f = fixture();
    let roleless = Principal::new(f.alice.subject_id(), []);

    let result = f.service.create(Some(&roleless), fields("x"));

    assert!(matches!(
        result,
        Err(ProfileError::Forbidden {
            operation: ProfileOperation::CreateOwn,
            ..
        })
    ));
}

// ============================================================================
// Partial Update Tests
// ============================================================================

#[test]
fn update_own_address_keeps_other_fields() {
    let f = fixture();
    let subject: UserId = "11111111-1111-1111-1111-111111111111".parse().unwrap();
    let store = Arc::clone(f.service.store());
    store
        .insert_user(User::new(subject, "Sam", "Owner", "sam@example.com").with_role("USER"))
        .unwrap();
    let sam = user_only(subject);
    let before = f.service.create(Some(&sam), fields("Old Road 9")).unwrap();

    let after = f
        .service
        .update_own(Some(&sam), ProfilePatch::empty().address("Main St 1"))
        .unwrap();

    assert_eq!(after.address, "Main St 1");
    assert_eq!(after.birthdate, before.birthdate);
    assert_eq!(after.age, before.age);
    assert_eq!(after.image_ref, before.image_ref);
    assert_eq!(store.find_by_owner(subject).unwrap(), Some(after));
}

#[test]
fn update_applies_every_present_field() {
    let f = fixture();
    f.service.create(Some(&f.alice), fields("a")).unwrap();
    let new_birthdate = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();

    let updated = f
        .service
        .update_own(
            Some(&f.alice),
            ProfilePatch::empty()
                .birthdate(new_birthdate)
                .image_ref("img/alice.png")
                .age(34),
        )
        .unwrap();

    assert_eq!(updated.address, "a");
    assert_eq!(updated.birthdate, new_birthdate);
    assert_eq!(updated.image_ref.as_deref(), Some("img/alice.png"));
    assert_eq!(updated.age, Some(34));
}

// ============================================================================
// By-ID Tests
// ============================================================================

#[test]
fn owner_reads_by_id_and_non_owner_is_forbidden() {
    let f = fixture();
    let profile = f.service.create(Some(&f.alice), fields("a")).unwrap();

    assert_eq!(
        f.service.get_by_id(Some(&f.alice), profile.id).unwrap(),
        profile
    );
    let denied = f.service.get_by_id(Some(&f.bob), profile.id);
    assert!(denied.unwrap_err().is_forbidden());
}

#[test]
fn admin_may_update_and_delete_any_profile() {
    let f = fixture();
    let profile = f.service.create(Some(&f.alice), fields("a")).unwrap();

    let updated = f
        .service
        .update_by_id(Some(&f.admin), profile.id, ProfilePatch::empty().age(41))
        .unwrap();
    assert_eq!(updated.age, Some(41));

    f.service.delete_by_id(Some(&f.admin), profile.id).unwrap();
    assert!(!f.service.has_profile(Some(&f.alice)).unwrap());
}

#[test]
fn non_owner_cannot_update_or_delete_by_id() {
    let f = fixture();
    let profile = f.service.create(Some(&f.alice), fields("a")).unwrap();

    let update = f
        .service
        .update_by_id(Some(&f.bob), profile.id, ProfilePatch::empty().address("hijack"));
    let delete = f.service.delete_by_id(Some(&f.bob), profile.id);

    assert!(update.unwrap_err().is_forbidden());
    assert!(delete.unwrap_err().is_forbidden());
    assert_eq!(f.service.get_own(Some(&f.alice)).unwrap(), profile);
}

#[test]
fn missing_profile_is_not_found_for_admin_but_forbidden_for_others() {
    let f = fixture();
    let missing = ProfileId::new(Uuid::nil());

    assert!(
        f.service
            .get_by_id(Some(&f.admin), missing)
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        f.service
            .get_by_id(Some(&f.bob), missing)
            .unwrap_err()
            .is_forbidden()
    );
    assert!(
        f.service
            .delete_by_id(Some(&f.admin), missing)
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn get_by_owner_follows_admin_or_owner_rule() {
    let f = fixture();
    let profile = f.service.create(Some(&f.alice), fields("a")).unwrap();
    let alice_id = f.alice.subject_id();

    assert_eq!(
        f.service.get_by_owner(Some(&f.alice), alice_id).unwrap(),
        profile
    );
    assert_eq!(
        f.service.get_by_owner(Some(&f.admin), alice_id).unwrap(),
        profile
    );
    assert!(
        f.service
            .get_by_owner(Some(&f.bob), alice_id)
            .unwrap_err()
            .is_forbidden()
    );
    assert!(
        f.service
            .get_by_owner(Some(&f.bob), f.bob.subject_id())
            .unwrap_err()
            .is_not_found()
    );
}

// ============================================================================
// Anonymous Caller Tests
// ============================================================================

#[test]
fn anonymous_caller_is_denied_everything() {
    let f = fixture();
    let profile = f.service.create(Some(&f.alice), fields("a")).unwrap();
    let page = PageRequest::first(10);

    let results = [
        f.service.create(None, fields("x")).map(|_| ()),
        f.service.get_own(None).map(|_| ()),
        f.service.update_own(None, ProfilePatch::empty()).map(|_| ()),
        f.service.delete_own(None),
        f.service.has_profile(None).map(|_| ()),
        f.service.get_by_id(None, profile.id).map(|_| ()),
        f.service
            .update_by_id(None, profile.id, ProfilePatch::empty())
            .map(|_| ()),
        f.service.delete_by_id(None, profile.id),
        f.service.get_by_owner(None, profile.owner_id).map(|_| ()),
        f.service
            .search(None, &SearchCriteria::default(), page.clone())
            .map(|_| ()),
        f.service.list_all(None, page).map(|_| ()),
    ];

    for result in results {
        assert!(result.unwrap_err().is_forbidden());
    }
}

// ============================================================================
// Search Tests
// ============================================================================

fn seeded() -> (Fixture, Vec<Profile>) {
    let f = fixture();
    let a = f
        .service
        .create(Some(&f.alice), NewProfile::new("12 Main Street", born()).with_age(25))
        .unwrap();
    let b = f
        .service
        .create(Some(&f.bob), NewProfile::new("7 Elm Road", born()).with_age(55))
        .unwrap();
    (f, vec![a, b])
}

#[test]
fn user_search_is_forbidden() {
    let (f, _) = seeded();

    let result = f.service.search(
        Some(&f.alice),
        &SearchCriteria::free_text("smith"),
        PageRequest::first(10),
    );

    assert!(matches!(
        result,
        Err(ProfileError::Forbidden {
            operation: ProfileOperation::Search,
            ..
        })
    ));
}

#[test]
fn free_text_ignores_min_age() {
    let (f, profiles) = seeded();
    // Alice Smith is 25, below the min age that full-text mode must ignore.
    let criteria = SearchCriteria::free_text("smith").with_min_age(30);

    let page = f
        .service
        .search(Some(&f.admin), &criteria, PageRequest::first(10))
        .unwrap();

    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content, vec![profiles[0].clone()]);
}

#[test_case("smith", 1; "bare term")]
#[test_case(" smith", 0; "leading space kept")]
fn free_text_term_is_not_trimmed(term: &str, expected: u64) {
    let (f, _) = seeded();

    let page = f
        .service
        .search(
            Some(&f.admin),
            &SearchCriteria::free_text(term),
            PageRequest::first(10),
        )
        .unwrap();

    assert_eq!(page.total_elements, expected);
}

#[test_case(SearchCriteria::default().with_min_age(30), 1; "min age")]
#[test_case(SearchCriteria::default().with_max_age(30), 1; "max age")]
#[test_case(SearchCriteria::default().with_address("ROAD"), 1; "address")]
#[test_case(SearchCriteria::default().with_address("main").with_min_age(30), 0; "and combined")]
#[test_case(SearchCriteria::default(), 2; "unconstrained")]
fn filtered_search(criteria: SearchCriteria, expected: u64) {
    let (f, _) = seeded();

    let page = f
        .service
        .search(Some(&f.admin), &criteria, PageRequest::first(10))
        .unwrap();

    assert_eq!(page.total_elements, expected);
    assert_eq!(page.number_of_elements() as u64, expected);
}

#[test]
fn list_all_is_admin_only_and_clamped() {
    let (f, _) = seeded();
    let service = f.service.with_limits(PageLimits {
        default_size: 1,
        max_size: 1,
    });

    let page = service
        .list_all(
            Some(&f.admin),
            PageRequest::first(50).with_sort(SortOrder::desc(SortKey::Age)),
        )
        .unwrap();
    assert_eq!(page.size, 1);
    assert_eq!(page.total_elements, 2);
    assert_eq!(page.content[0].age, Some(55));

    assert!(
        service
            .list_all(Some(&f.bob), PageRequest::first(10))
            .unwrap_err()
            .is_forbidden()
    );
}

#[test]
fn page_limits_fill_defaults() {
    let limits = PageLimits::default();

    let request = limits.request(None, None);
    assert_eq!((request.page, request.size), (0, 20));

    let request = limits.request(Some(2), Some(1000));
    assert_eq!((request.page, request.size), (2, 100));
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn empty_patch_is_idempotent(repeats in 1usize..5) {
        let f = fixture();
        let created = f.service.create(Some(&f.alice), fields("Stable Lane")).unwrap();

        for _ in 0..repeats {
            let updated = f.service.update_own(Some(&f.alice), ProfilePatch::empty()).unwrap();
            prop_assert_eq!(&updated, &created);
        }
        prop_assert_eq!(f.service.get_own(Some(&f.alice)).unwrap(), created);
    }

    #[test]
    fn non_admin_non_owner_is_denied_by_id(extra_user_role in any::<bool>()) {
        let f = fixture();
        let profile = f.service.create(Some(&f.alice), fields("a")).unwrap();
        let roles: Vec<RoleName> = if extra_user_role { vec![RoleName::User] } else { vec![] };
        let stranger = Principal::new(UserId::generate(), roles);

        prop_assert!(f.service.get_by_id(Some(&stranger), profile.id).unwrap_err().is_forbidden());
        prop_assert!(f
            .service
            .update_by_id(Some(&stranger), profile.id, ProfilePatch::empty().age(1))
            .unwrap_err()
            .is_forbidden());
        prop_assert!(f.service.delete_by_id(Some(&stranger), profile.id).unwrap_err().is_forbidden());
    }

    #[test]
    fn admin_is_allowed_regardless_of_ownership(age in 0u32..120) {
        let f = fixture();
        let admin = Principal::new(UserId::generate(), [RoleName::Admin]);
        let profile = f.service.create(Some(&f.bob), fields("b")).unwrap();

        prop_assert!(f.service.get_by_id(Some(&admin), profile.id).is_ok());
        prop_assert_eq!(
            f.service
                .update_by_id(Some(&admin), profile.id, ProfilePatch::empty().age(age))
                .unwrap()
                .age,
            Some(age)
        );
        prop_assert!(f
            .service
            .search(Some(&admin), &SearchCriteria::default(), PageRequest::first(5))
            .is_ok());
        prop_assert!(f.service.delete_by_id(Some(&admin), profile.id).is_ok());
    }
}
