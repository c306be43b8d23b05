//! End-to-end runs against a scripted reservation site

mod common;

use chrono::{NaiveDate, Weekday};
use std::sync::Arc;

use common::{fixtures, happy_site, site, RecordingNotifier, ScriptedTransport, StaticInputs};
use yoyaku::crawler::{NavState, RunCoordinator, SessionNavigator, Transport};
use yoyaku::error::{Error, NavigationError, ScreenError};
use yoyaku::matcher::RejectReason;
use yoyaku::models::Credential;

fn all_weekdays() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn coordinator(
    transport: ScriptedTransport,
    notifier: Arc<RecordingNotifier>,
) -> (RunCoordinator, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let coordinator = RunCoordinator::new(
        Box::new(SharedTransport(transport.clone())),
        site(),
        all_weekdays(),
        notifier,
    );
    (coordinator, transport)
}

/// Lets the test keep a handle on the transport the coordinator owns
struct SharedTransport(Arc<ScriptedTransport>);

#[async_trait::async_trait]
impl Transport for SharedTransport {
    async fn get(&self, url: &str) -> Result<Option<String>, yoyaku::error::FetchError> {
        self.0.get(url).await
    }

    async fn post(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<Option<String>, yoyaku::error::FetchError> {
        self.0.post(url, form).await
    }
}

#[tokio::test]
async fn test_run_books_matching_slot() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, transport) = coordinator(happy_site(fixtures::HELD_EMPTY), notifier.clone());
    let inputs = StaticInputs::new("20250607/MO/茅ヶ崎公園").excluding("0608");

    let report = coordinator.run(&inputs, today()).await.unwrap();

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.successes.len(), 1);
    let booked = &report.successes[0];
    assert_eq!(booked.facility, "茅ヶ崎公園 1コート");
    assert_eq!(booked.date, "20250607");
    assert_eq!(booked.slot.clock_time, "09:00");
    assert_eq!(report.attempts, 1);
    assert_eq!(report.days_visited, 1);

    // Booking form resubmitted with every named field
    let submit = transport
        .requests()
        .into_iter()
        .find(|r| r.url.contains("gin_submit"))
        .unwrap();
    assert_eq!(submit.method, "POST");
    assert_eq!(
        submit.form,
        vec![
            ("g_sessionid".to_string(), "S1".to_string()),
            ("u_slot".to_string(), "k1".to_string()),
        ]
    );

    // Excluded day never fetched
    assert!(!transport.requested("gin_z_second?u_genzai_idx=2&ymd=20250608"));

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("6月7日（土）09:00\n茅ヶ崎公園 1コート\n"));
}

#[tokio::test]
async fn test_run_uses_two_logins_in_order() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, transport) = coordinator(happy_site(fixtures::HELD_EMPTY), notifier);
    let inputs = StaticInputs::new("20250607/MO/茅ヶ崎公園").excluding("0608");

    coordinator.run(&inputs, today()).await.unwrap();

    let requests = transport.requests();
    let logins: Vec<_> = requests
        .iter()
        .enumerate()
        .filter(|(_, r)| r.url.contains("gin_login"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(logins.len(), 2);

    let held_at = requests
        .iter()
        .position(|r| r.url.contains("gin_s_yyklist_in"))
        .unwrap();
    let category_at = requests
        .iter()
        .position(|r| r.url.contains("gin_z_bunrui"))
        .unwrap();
    assert!(logins[0] < held_at && held_at < logins[1] && logins[1] < category_at);

    let login = &requests[logins[0]];
    assert_eq!(login.method, "POST");
    assert!(login.form.contains(&("g_kinonaiyo".to_string(), "10".to_string())));
    assert!(login.form.contains(&("u_userid".to_string(), "user1".to_string())));
    assert!(login.form.contains(&("u_passwd".to_string(), "secret".to_string())));
    assert!(login.form.contains(&("g_sessionid".to_string(), "S1".to_string())));

    let category = &requests[category_at];
    assert!(category.url.ends_with("gin_z_bunrui?g_sessionid=S1"));
    assert!(category.form.contains(&("g_kinonaiyo".to_string(), "11".to_string())));
    assert!(category.form.contains(&("u_genzai_idx".to_string(), "0".to_string())));

    assert!(transport.requested("gin_z_first?u_genzai_idx=1&g_bunruicd=1&g_sessionid=S1"));
    assert!(transport.requested("gin_z_first?g_kinonaiyo=10&u_genzai_idx=1&u_tab=2&g_sessionid=S1"));
}

#[tokio::test]
async fn test_dry_run_does_not_submit() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, transport) = coordinator(happy_site(fixtures::HELD_EMPTY), notifier.clone());
    let coordinator = coordinator.with_dry_run(true);
    let inputs = StaticInputs::new("20250607/MO/茅ヶ崎公園").excluding("0608");

    let report = coordinator.run(&inputs, today()).await.unwrap();

    assert!(report.successes.is_empty());
    assert_eq!(report.attempts, 1);
    assert!(transport.requested("gin_slot?k=1"));
    assert!(!transport.requested("gin_submit"));
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_held_reservation_exhausts_quota() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, transport) = coordinator(happy_site(fixtures::HELD_ONE), notifier);
    let inputs = StaticInputs::new("20250607/MO/茅ヶ崎公園/1").excluding("0608");

    let report = coordinator.run(&inputs, today()).await.unwrap();

    assert!(report.successes.is_empty());
    assert_eq!(report.rejection_tally.get(&RejectReason::QuotaExhausted), Some(&1));
    assert!(!transport.requested("gin_slot"));
}

#[tokio::test]
async fn test_several_wishes_book_in_wish_order() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, _transport) = coordinator(happy_site(fixtures::HELD_EMPTY), notifier);
    let inputs =
        StaticInputs::new("20250607/MO/茅ヶ崎公園/1,20250607/NI/茅ヶ崎公園/1").excluding("0608");

    let report = coordinator.run(&inputs, today()).await.unwrap();

    let times: Vec<&str> = report
        .successes
        .iter()
        .map(|o| o.slot.clock_time.as_str())
        .collect();
    assert_eq!(times, vec!["09:00", "19:00"]);
}

#[tokio::test]
async fn test_day_failure_is_collected() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, _transport) = coordinator(happy_site(fixtures::HELD_EMPTY), notifier);
    // 0608 has no scripted screens, so its walk hits an empty body
    let inputs = StaticInputs::new("20250607/MO/茅ヶ崎公園");

    let report = coordinator.run(&inputs, today()).await.unwrap();

    assert_eq!(report.successes.len(), 1);
    assert_eq!(report.errors.len(), 1);
    match &report.errors[0] {
        Error::Day { date, source } => {
            assert_eq!(date, "20250608");
            assert!(matches!(
                source,
                NavigationError::Screen(ScreenError::EmptyBody { .. })
            ));
        }
        other => panic!("expected a day error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_error_screen_is_fatal() {
    let transport = ScriptedTransport::new()
        .route("gin_init2", fixtures::INIT)
        .route("gin_login", fixtures::ERROR_SCREEN);
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, transport) = coordinator(transport, notifier);
    let inputs = StaticInputs::new("20250607/MO/茅ヶ崎公園");

    let err = coordinator.run(&inputs, today()).await.unwrap_err();

    assert!(err.is_fatal_to_run());
    match err {
        Error::Session { phase, source } => {
            assert_eq!(phase, "login");
            assert!(matches!(
                source,
                NavigationError::Screen(ScreenError::ErrorMarker { .. })
            ));
        }
        other => panic!("expected a session error, got {other:?}"),
    }
    assert!(!transport.requested("gin_s_yyklist_in"));
}

#[tokio::test]
async fn test_unusable_root_url_is_a_config_error() {
    let transport = Arc::new(happy_site(fixtures::HELD_EMPTY));
    let mut site = site();
    site.root_url = "not a url".to_string();
    let coordinator = RunCoordinator::new(
        Box::new(SharedTransport(transport.clone())),
        site,
        all_weekdays(),
        Arc::new(RecordingNotifier::default()),
    );
    let inputs = StaticInputs::new("20250607/MO/茅ヶ崎公園");

    let err = coordinator.run(&inputs, today()).await.unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.is_fatal_to_run());
    assert!(!transport.requested("gin_init2"));
}

#[tokio::test]
async fn test_malformed_wish_list_is_fatal() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (coordinator, _transport) = coordinator(happy_site(fixtures::HELD_EMPTY), notifier);
    let inputs = StaticInputs::new("20250607/MO");

    let err = coordinator.run(&inputs, today()).await.unwrap_err();
    assert!(matches!(err, Error::Input(_)));
}

#[tokio::test]
async fn test_navigator_states() {
    let transport = happy_site(fixtures::HELD_EMPTY);
    let site = site();
    let credential = Credential {
        name: String::new(),
        id: "user1".into(),
        pass: "secret".into(),
    };
    let mut navigator =
        SessionNavigator::new(&transport, &site, all_weekdays()).unwrap();
    assert_eq!(navigator.state(), NavState::Start);

    let calendar = navigator.open_calendar(&credential).await.unwrap();
    assert_eq!(navigator.state(), NavState::CalendarFetched);
    assert_eq!(navigator.context().session_id, "S1");
    assert_eq!(navigator.context().index, 1);
    assert!(calendar.contains("MonthTbl"));

    let days = navigator
        .month_days("/cultos/reserve/gin_month?u_hyojiym=202506&g_sessionid=S1")
        .await
        .unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(navigator.state(), NavState::MonthFetched);

    let link = navigator.day_link(&days[0]);
    let entries = navigator.day_availability(&link, "20250607").await.unwrap();
    assert_eq!(navigator.state(), NavState::FacilityIframeFetched);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].facility_name, "茅ヶ崎公園 1コート");
    assert_eq!(
        entries[1].slots[0].action_ref.as_deref(),
        Some("/cultos/reserve/gin_slot?k=1")
    );
}

#[tokio::test]
async fn test_weekday_filter_limits_days() {
    let transport = happy_site(fixtures::HELD_EMPTY);
    let site = site();
    let mut navigator =
        SessionNavigator::new(&transport, &site, vec![Weekday::Sun]).unwrap();

    let days = navigator
        .month_days("/cultos/reserve/gin_month?u_hyojiym=202506&g_sessionid=S1")
        .await
        .unwrap();
    assert_eq!(
        days,
        vec!["/cultos/reserve/gin_z_kaisi_smk_rsp?u_genzai_idx=4&ymd=20250608"]
    );
}
