//! Unit tests for dossier-store

use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use dossier_types::{NewProfile, Profile, ProfileId, User, UserId};
use proptest::prelude::*;

use crate::{
    MemoryStore, PageRequest, ProfileFilter, ProfileStore, SortKey, SortOrder, StoreError,
    UserStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn user(first: &str, last: &str) -> User {
    User::new(
        UserId::generate(),
        first,
        last,
        format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
    )
}

fn profile_for(owner: &User, address: &str, age: Option<u32>) -> Profile {
    let mut fields = NewProfile::new(address, date(1990, 5, 17));
    fields.age = age;
    Profile::create(ProfileId::generate(), owner.id, fields)
}

fn seed(store: &MemoryStore, profile: Profile) {
    store
        .transaction(|tx| tx.insert(profile))
        .expect("seed insert");
}

// ============================================================================
// User Lookup Tests
// ============================================================================

#[test]
fn find_user_returns_inserted_user() {
    let alice = user("Alice", "Liddell");
    let store = MemoryStore::new().with_user(alice.clone());

    assert_eq!(store.find_user(alice.id).unwrap(), Some(alice));
    assert_eq!(store.find_user(UserId::generate()).unwrap(), None);
}

// ============================================================================
// Transaction Tests
// ============================================================================

#[test]
fn committed_insert_is_visible() {
    let alice = user("Alice", "Liddell");
    let store = MemoryStore::new().with_user(alice.clone());
    let profile = profile_for(&alice, "Wonderland 1", Some(7));

    seed(&store, profile.clone());

    assert_eq!(store.find_by_id(profile.id).unwrap(), Some(profile.clone()));
    assert_eq!(store.find_by_owner(alice.id).unwrap(), Some(profile));
    assert!(store.exists_by_owner(alice.id).unwrap());
}

#[test]
fn failed_transaction_rolls_back_every_write() {
    let alice = user("Alice", "Liddell");
    let store = MemoryStore::new().with_user(alice.clone());
    let profile = profile_for(&alice, "Wonderland 1", None);

    let result: Result<(), StoreError> = store.transaction(|tx| {
        tx.insert(profile.clone())?;
        assert!(tx.exists_by_owner(alice.id)?);
        Err(StoreError::Backend("abort".into()))
    });

    assert!(result.is_err());
    assert_eq!(store.profile_count().unwrap(), 0);
    assert!(!store.exists_by_owner(alice.id).unwrap());
}

#[test]
fn second_profile_for_owner_is_unique_violation() {
    let alice = user("Alice", "Liddell");
    let store = MemoryStore::new().with_user(alice.clone());
    seed(&store, profile_for(&alice, "first", None));

    let result = store.transaction(|tx| tx.insert(profile_for(&alice, "second", None)));

    assert_eq!(result, Err(StoreError::UniqueViolation { owner: alice.id }));
    assert_eq!(store.profile_count().unwrap(), 1);
}

#[test]
fn insert_for_unknown_owner_fails() {
    let ghost = user("Ghost", "Writer");
    let store = MemoryStore::new();

    let result = store.transaction(|tx| tx.insert(profile_for(&ghost, "nowhere", None)));

    assert_eq!(result, Err(StoreError::UnknownOwner(ghost.id)));
}

#[test]
fn save_replaces_and_delete_removes() {
    let alice = user("Alice", "Liddell");
    let store = MemoryStore::new().with_user(alice.clone());
    let mut profile = profile_for(&alice, "old", Some(7));
    seed(&store, profile.clone());

    profile.address = "new".to_string();
    store.transaction(|tx| tx.save(profile.clone())).unwrap();
    assert_eq!(store.find_by_id(profile.id).unwrap().unwrap().address, "new");

    assert!(store.transaction(|tx| tx.delete(profile.id)).unwrap());
    assert!(!store.transaction(|tx| tx.delete(profile.id)).unwrap());
    assert_eq!(store.find_by_id(profile.id).unwrap(), None);
}

#[test]
fn save_of_missing_profile_fails() {
    let alice = user("Alice", "Liddell");
    let store = MemoryStore::new().with_user(alice.clone());
    let profile = profile_for(&alice, "never stored", None);

    let result = store.transaction(|tx| tx.save(profile.clone()));

    assert_eq!(result, Err(StoreError::MissingProfile(profile.id)));
}

#[test]
fn concurrent_creates_for_same_owner_admit_exactly_one() {
    let alice = user("Alice", "Liddell");
    let store = Arc::new(MemoryStore::new().with_user(alice.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            let alice = alice.clone();
            thread::spawn(move || {
                store.transaction(|tx| {
                    if tx.exists_by_owner(alice.id)? {
                        return Err(StoreError::UniqueViolation { owner: alice.id });
                    }
                    tx.insert(profile_for(&alice, &format!("attempt {i}"), None))
                })
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(Result::is_ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(store.profile_count().unwrap(), 1);
}

// ============================================================================
// Query Tests
// ============================================================================

fn populated() -> (MemoryStore, Vec<User>) {
    let users = vec![
        user("John", "Smith"),
        user("Jane", "Doe"),
        user("Ada", "Lovelace"),
    ];
    let store = users
        .iter()
        .cloned()
        .fold(MemoryStore::new(), MemoryStore::with_user);

    seed(&store, profile_for(&users[0], "12 Main Street", Some(45)));
    seed(&store, profile_for(&users[1], "7 Elm Road", Some(30)));
    seed(&store, profile_for(&users[2], "1 Main Square", None));

    (store, users)
}

#[test]
fn full_text_search_matches_owner_names() {
    let (store, users) = populated();

    let page = store
        .full_text_search("smith", &PageRequest::first(10))
        .unwrap();

    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].owner_id, users[0].id);
}

#[test]
fn full_text_search_matches_address_or_email() {
    let (store, _) = populated();

    let by_address = store.full_text_search("MAIN", &PageRequest::first(10)).unwrap();
    assert_eq!(by_address.total_elements, 2);

    let by_email = store
        .full_text_search("jane.doe@", &PageRequest::first(10))
        .unwrap();
    assert_eq!(by_email.total_elements, 1);
}

#[test]
fn filters_are_and_combined() {
    let (store, users) = populated();
    let filter = ProfileFilter {
        address: Some("main".into()),
        min_age: Some(40),
        max_age: None,
    };

    let page = store
        .find_with_filters(&filter, &PageRequest::first(10))
        .unwrap();

    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].owner_id, users[0].id);
}

#[test]
fn unconstrained_filter_returns_everything() {
    let (store, _) = populated();

    let page = store
        .find_with_filters(&ProfileFilter::default(), &PageRequest::first(10))
        .unwrap();

    assert_eq!(page.total_elements, 3);
}

#[test]
fn results_are_sorted_then_paged() {
    let (store, _) = populated();
    let request = PageRequest::new(0, 2).with_sort(SortOrder::desc(SortKey::Age));

    let page = store.find_all(&request).unwrap();

    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages(), 2);
    let ages: Vec<_> = page.content.iter().map(|p| p.age).collect();
    assert_eq!(ages, vec![Some(45), Some(30)]);

    let rest = store.find_all(&PageRequest { page: 1, ..request }).unwrap();
    assert_eq!(rest.content.len(), 1);
    assert_eq!(rest.content[0].age, None);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn paging_partitions_the_result_set(count in 0usize..40, size in 1u32..8) {
        let owners: Vec<User> = (0..count).map(|i| user("U", &format!("N{i}"))).collect();
        let store = owners.iter().cloned().fold(MemoryStore::new(), MemoryStore::with_user);
        for owner in &owners {
            seed(&store, profile_for(owner, "addr", None));
        }

        let first = store.find_all(&PageRequest::first(size)).unwrap();
        let pages = first.total_pages();
        let mut seen = Vec::new();
        for page in 0..pages {
            let p = store.find_all(&PageRequest::new(u32::try_from(page).unwrap(), size)).unwrap();
            seen.extend(p.content.into_iter().map(|p| p.id));
        }

        prop_assert_eq!(seen.len(), count);
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), count);
    }
}
