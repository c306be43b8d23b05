//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;

use yoyaku::config::SiteConfig;
use yoyaku::crawler::Transport;
use yoyaku::error::FetchError;
use yoyaku::models::{Credential, ExclusionDate, ReservationEntry, WishListEntry};
use yoyaku::notifications::{Notifier, NotifyError};
use yoyaku::sources::{parse_exclusions, parse_wish_list, InputSource};
use yoyaku::utils::error::InputError;

pub const ROOT: &str = "https://yoyaku.example.jp";

/// Site configuration pointing at [`ROOT`]
pub fn site() -> SiteConfig {
    SiteConfig {
        root_url: ROOT.to_string(),
        ..SiteConfig::default()
    }
}

/// One recorded exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub form: Vec<(String, String)>,
}

/// Transport answering from a route table
///
/// The first route whose pattern is a substring of the URL answers. Unknown
/// URLs get an empty body.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, String)>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, pattern: &str, body: impl Into<String>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((pattern.to_string(), body.into()));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, fragment: &str) -> bool {
        self.requests().iter().any(|r| r.url.contains(fragment))
    }

    fn answer(&self, method: &'static str, url: &str, form: &[(String, String)]) -> Option<String> {
        self.requests.lock().unwrap().push(Request {
            method,
            url: url.to_string(),
            form: form.to_vec(),
        });
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, body)| body.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Option<String>, FetchError> {
        Ok(self.answer("GET", url, &[]))
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> Result<Option<String>, FetchError> {
        Ok(self.answer("POST", url, form))
    }
}

/// Notifier keeping every message
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// In-memory inputs
pub struct StaticInputs {
    pub wish_list: String,
    pub exclusions: String,
    pub extra_held: Vec<ReservationEntry>,
}

impl StaticInputs {
    pub fn new(wish_list: &str) -> Self {
        Self {
            wish_list: wish_list.to_string(),
            exclusions: String::new(),
            extra_held: Vec::new(),
        }
    }

    pub fn excluding(mut self, exclusions: &str) -> Self {
        self.exclusions = exclusions.to_string();
        self
    }
}

impl InputSource for StaticInputs {
    fn credential(&self) -> Result<Credential, InputError> {
        Ok(Credential {
            name: "test".into(),
            id: "user1".into(),
            pass: "secret".into(),
        })
    }

    fn wish_list(&self) -> Result<Vec<WishListEntry>, InputError> {
        parse_wish_list(&self.wish_list)
    }

    fn exclusions(&self, current_year: i32) -> Result<Vec<ExclusionDate>, InputError> {
        Ok(parse_exclusions(&self.exclusions, current_year))
    }

    fn extra_held(&self) -> Result<Vec<ReservationEntry>, InputError> {
        Ok(self.extra_held.clone())
    }
}

/// Screens of the reservation site
pub mod fixtures {
    pub const INIT: &str =
        r#"<html><body><a href="/cultos/reserve/gin_menu?g_sessionid=S1&u=1">menu</a></body></html>"#;

    pub const MENU: &str = "<html><body><p>メニュー</p></body></html>";

    pub const ERROR_SCREEN: &str =
        r#"<html><body onload="dspErr()"><p>エラー</p></body></html>"#;

    pub const HELD_EMPTY: &str =
        "<html><body><table><tr><th>利用日時</th><th>施設</th></tr></table></body></html>";

    pub const HELD_ONE: &str = r#"<html><body><table>
        <tr><th>利用日時</th><th>施設</th></tr>
        <tr><td><a href="/cultos/reserve/gin_s_detail?ymd=20250607">2025年6月7日(土) 09:00〜11:00</a></td><td>茅ヶ崎公園 2コート</td></tr>
        </table></body></html>"#;

    pub const DATE_TAB: &str =
        r#"<html><body><iframe src="/cultos/reserve/gin_calendar?g_sessionid=S1"></iframe></body></html>"#;

    pub const CALENDAR: &str = r#"<html><body><table id="MonthTbl"><tr>
        <td><a href="/cultos/reserve/gin_month?u_hyojiym=202506&g_sessionid=S1">6月</a></td>
        </tr></table></body></html>"#;

    pub const EMPTY_MONTH: &str = "<html><body><p>空きなし</p></body></html>";

    pub const JUNE: &str = r#"<html><body><table class="link-table"><tr>
        <td>1</td>
        <td><a href="/cultos/reserve/gin_z_kaisi_smk_rsp?u_genzai_idx=4&ymd=20250607">7</a></td>
        <td><a href="/cultos/reserve/gin_z_kaisi_smk_rsp?u_genzai_idx=4&ymd=20250608">8</a></td>
        </tr></table></body></html>"#;

    pub const DAY_0607: &str =
        r#"<html><body><iframe src="/cultos/reserve/gin_dayframe?ymd=20250607"></iframe></body></html>"#;

    pub const DAY_FRAME_0607: &str = r#"<html><body>
        <a href="/cultos/reserve/gin_purpose?p=1&ymd=20250607">野球</a>
        <a href="/cultos/reserve/gin_purpose?p=2&ymd=20250607">テニス</a>
        </body></html>"#;

    pub const PURPOSE_0607: &str =
        r#"<html><body><iframe src="/cultos/reserve/gin_courts?ymd=20250607"></iframe></body></html>"#;

    pub const COURTS_0607: &str = r#"<html><body><table class="link-table">
        <tr><th>施設</th><th>09:00</th><th>11:00</th><th>19:00</th></tr>
        <tr><td>柳島スポーツ公園 1コート</td><td><a href="/cultos/reserve/gin_slot?k=2">○</a></td><td>×</td><td>×</td></tr>
        <tr><td>茅ヶ崎公園 1コート</td><td><a href="/cultos/reserve/gin_slot?k=1">○</a></td><td>×</td><td><a href="/cultos/reserve/gin_slot?k=3">○</a></td></tr>
        </table></body></html>"#;

    pub const BOOKING_PAGE: &str = r#"<html><body>
        <form name="form_nm" action="/cultos/reserve/gin_submit" method="post">
          <input type="hidden" name="g_sessionid" value="S1">
          <input type="hidden" name="u_slot" value="k1">
          <input type="submit" value="予約">
        </form></body></html>"#;

    pub const BOOKED: &str = "<html><body><p>予約が完了しました</p></body></html>";
}

/// Transport scripted with a full, successful walk
pub fn happy_site(held_list: &str) -> ScriptedTransport {
    use fixtures::*;

    ScriptedTransport::new()
        .route("gin_init2", INIT)
        .route("gin_login", MENU)
        .route("gin_s_yyklist_in", held_list)
        .route("gin_z_bunrui", MENU)
        .route("u_tab=2", DATE_TAB)
        .route("gin_z_first", MENU)
        .route("gin_calendar", CALENDAR)
        .route("u_hyojiym=202505", EMPTY_MONTH)
        .route("u_hyojiym=202506", JUNE)
        .route("gin_z_second?u_genzai_idx=2&ymd=20250607", DAY_0607)
        .route("gin_dayframe?ymd=20250607", DAY_FRAME_0607)
        .route("gin_purpose?p=2&ymd=20250607", PURPOSE_0607)
        .route("gin_courts?ymd=20250607", COURTS_0607)
        .route("gin_slot", BOOKING_PAGE)
        .route("gin_submit", BOOKED)
}
