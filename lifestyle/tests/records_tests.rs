use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use lifestyle::anniversary::{Anniversaries, AnniversaryDraft, AnniversaryPatch};
use lifestyle::diary::Diary;
use lifestyle::ledger::Ledger;
use lifestyle::moments::{Author, Moments};
use lifestyle::movies::{MediaKind, MovieDraft, MovieFilter, Watchlist};
use lifestyle::schedule::{Planner, ScheduleDraft};
use lifestyle::{AppEvent, EventBus, FileStore, KeyValueStore, MemoryStore, ValidationError};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn expenses_survive_a_reopen_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let written = {
        let mut store = FileStore::open(&path);
        let mut ledger = Ledger::new(&mut store);
        ledger.set_balance(500.0).unwrap();
        ledger.add_expense("Coffee", 18.5, at(2024, 5, 12, 9, 30)).unwrap();
        ledger.add_expense("Movie tickets", 90.0, at(2024, 5, 14, 19, 5)).unwrap();
        ledger.add_expense("Groceries", 120.25, at(2024, 5, 15, 18, 0)).unwrap();
        ledger.expenses()
    };

    assert_eq!(written[0].name, "Groceries");
    assert_eq!(written[2].name, "Coffee");

    let mut reopened = FileStore::open(&path);
    let ledger = Ledger::new(&mut reopened);
    assert_eq!(ledger.expenses(), written);
    assert_eq!(ledger.balance(), Some(500.0));

    let summary = ledger.summary(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
    assert_eq!(summary.today, 120.25);
    assert_eq!(summary.week, 228.75);
    assert_eq!(summary.month, 228.75);
}

#[test]
fn invalid_expenses_are_not_saved() {
    let mut store = MemoryStore::new();
    let mut ledger = Ledger::new(&mut store);
    let now = at(2024, 5, 15, 12, 0);

    assert!(matches!(
        ledger.add_expense("  ", 10.0, now),
        Err(ValidationError::Required("name"))
    ));
    assert!(matches!(
        ledger.add_expense("Tea", 0.0, now),
        Err(ValidationError::InvalidAmount)
    ));
    assert!(matches!(
        ledger.add_expense("Tea", f64::NAN, now),
        Err(ValidationError::InvalidAmount)
    ));
    assert!(matches!(
        ledger.set_balance(-1.0),
        Err(ValidationError::InvalidBalance)
    ));
    assert!(ledger.expenses().is_empty());

    let tea = ledger.add_expense("Tea", 8.0, now).unwrap();
    let edited = ledger.edit_expense(&tea.id, "Milk tea", 12.0, None).unwrap();
    assert_eq!(edited.date, now);
    assert_eq!(ledger.expenses()[0].amount, 12.0);
    assert!(ledger.delete_expense(&tea.id).unwrap());
    assert!(ledger.expenses().is_empty());
}

#[test]
fn pinning_a_second_anniversary_unpins_the_first() {
    let mut store = MemoryStore::new();
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let mut book = Anniversaries::new(&mut store).with_events(bus.clone());
    let now = at(2024, 5, 15, 12, 0);
    let day = NaiveDate::from_ymd_opt(2020, 2, 14).unwrap();

    let first = book.add(AnniversaryDraft::new("First date", day).pinned(), now).unwrap();
    assert_eq!(book.top().map(|a| a.id), Some(first.id.clone()));

    let second = book.add(AnniversaryDraft::new("Wedding", day).pinned(), now).unwrap();
    let top: Vec<_> = book.all().into_iter().filter(|a| a.is_top).collect();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, second.id);

    assert!(book.set_top(&first.id, now).unwrap());
    assert_eq!(book.top().map(|a| a.id), Some(first.id.clone()));

    // A rename keeps the pin; clearing the reminder drops it.
    let renamed = AnniversaryPatch {
        name: Some("Renamed".into()),
        ..Default::default()
    };
    let updated = book.update(&first.id, renamed, now).unwrap();
    assert!(updated.reminder && updated.is_top);
    assert_eq!(book.top().map(|a| a.name), Some("Renamed".to_string()));

    let unpin = AnniversaryPatch {
        reminder: Some(false),
        ..Default::default()
    };
    let updated = book.update(&first.id, unpin, now).unwrap();
    assert!(!updated.reminder && !updated.is_top);
    assert_eq!(book.top(), None);

    for _ in 0..5 {
        assert_eq!(rx.try_recv().unwrap(), AppEvent::AnniversaryUpdated);
    }
    assert!(rx.try_recv().is_err());
}

#[test]
fn overlapping_schedule_is_rejected_but_back_to_back_is_fine() {
    let mut store = MemoryStore::new();
    let mut planner = Planner::new(&mut store);
    let now = at(2024, 5, 1, 8, 0);
    let day = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    planner.add(ScheduleDraft::new("Dinner", day, hm(18, 0)).with_duration(90), now).unwrap();

    let clash = planner.add(ScheduleDraft::new("Call mum", day, hm(19, 0)), now);
    match clash {
        Err(ValidationError::ScheduleConflict(title)) => assert_eq!(title, "Dinner"),
        other => panic!("expected a conflict, got {other:?}"),
    }

    planner.add(ScheduleDraft::new("Walk", day, hm(19, 30)), now).unwrap();
    planner.add(ScheduleDraft::new("Lunch", day, hm(12, 0)), now).unwrap();
    let next_day = day.succ_opt().unwrap();
    planner.add(ScheduleDraft::new("Call mum", next_day, hm(19, 0)), now).unwrap();

    let titles: Vec<String> = planner.for_date(day).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, ["Lunch", "Dinner", "Walk"]);
    assert_eq!(planner.history()[0].date, next_day);

    assert!(matches!(
        planner.add(ScheduleDraft::new("Nap", day, hm(6, 0)).with_duration(0), now),
        Err(ValidationError::NotPositive("duration"))
    ));
}

#[test]
fn moments_feed_likes_and_comments() {
    let mut store = MemoryStore::new();
    let mut feed = Moments::new(&mut store);
    let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();

    assert!(matches!(
        feed.publish("   ", None, now),
        Err(ValidationError::Required(_))
    ));
    let photo = feed.publish("", Some("data:image/png;base64,AAA".into()), now).unwrap();
    let post = feed.publish("Sunset at the pier", None, now).unwrap();
    assert_eq!(feed.posts(now)[0].id, post.id);
    assert_eq!(feed.posts(now)[1].id, photo.id);

    let liked = feed.toggle_like(&post.id, now).unwrap();
    assert!(liked.liked);
    assert_eq!(liked.likes, 1);
    let unliked = feed.toggle_like(&post.id, now).unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.likes, 0);

    assert!(feed.add_comment(&post.id, "  ", now).is_err());
    let commented = feed.add_comment(&post.id, "Beautiful", now).unwrap();
    assert_eq!(commented.comments.len(), 1);
    assert_eq!(commented.comments[0].author, Author::Me);

    assert_eq!(feed.search("pier", now).len(), 1);
    assert_eq!(feed.search("  ", now).len(), 2);
    assert!(feed.delete(&photo.id, now).unwrap());
    assert_eq!(feed.posts(now).len(), 1);
}

#[test]
fn legacy_posts_are_normalized_on_read() {
    let mut store = MemoryStore::new();
    store
        .set(
            "posts",
            r#"[{"id":"1","text":"old","createdAt":"2023-01-01T00:00:00.000Z","author":"friend","likes":"2"}]"#
                .to_string(),
        )
        .unwrap();
    let feed = Moments::new(&mut store);
    let now = Utc::now();
    let posts = feed.posts(now);
    assert_eq!(posts[0].author, Author::Friend);
    assert_eq!(posts[0].likes, 2);
    assert!(posts[0].liked);
    assert_eq!(posts[0].created_at, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn watchlist_seeds_once_and_tracks_flags() {
    let mut store = MemoryStore::new();
    let mut list = Watchlist::new(&mut store);
    let now = at(2024, 5, 15, 12, 0);

    assert!(list.seed_defaults(now).unwrap());
    assert!(!list.seed_defaults(now).unwrap());
    assert_eq!(list.filtered(MovieFilter::Only(MediaKind::Tv)).len(), 2);

    let mut draft = MovieDraft::new("Before Sunrise", MediaKind::Movie, 1995);
    assert!(list.add(draft.clone(), now).is_err());
    draft.genre = "Romance".into();
    draft.description = "Two strangers meet on a train.".into();
    let added = list.add(draft, now).unwrap();

    list.toggle_watched(&added.id).unwrap();
    let shared = list.share(&added.id, None).unwrap();
    assert_eq!(shared.shared_with.as_deref(), Some("friend"));
    assert_eq!(list.watched_count(), 1);
    assert_eq!(list.shared_count(), 1);
}

#[test]
fn diary_history_lists_saved_days() {
    let mut store = MemoryStore::new();
    let mut diary = Diary::new(&mut store);
    let may = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
    diary.save(may(3), "<p>rain</p>", at(2024, 5, 3, 22, 0)).unwrap();
    diary.save(may(9), "<p>picnic</p>", at(2024, 5, 9, 21, 0)).unwrap();

    assert_eq!(diary.history_dates(), vec![may(9), may(3)]);
    assert_eq!(diary.html_for(may(3)), "<p>rain</p>");
    assert_eq!(diary.html_for(may(4)), "");
}
