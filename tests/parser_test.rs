//! Parser tests against realistic screens of the reservation site

use chrono::Weekday;

use yoyaku::models::{FacilityArea, TimeBand};
use yoyaku::parser::{
    active_month_links, booking_form, day_links, extract_slots, held_reservations, purpose_link,
};

const COURT_TABLE: &str = r#"<html><head><meta charset="Shift_JIS"></head><body>
<table class="header"><tr><td>茅ヶ崎市施設予約</td></tr></table>
<table class="link-table">
  <tr><th>施設</th><th>9:00</th><th>11:00</th><th>13:00</th><th>15:00</th><th>17:00</th><th>19:00</th></tr>
  <tr>
    <td>茅ヶ崎公園庭球場 Aコート</td>
    <td><a href="/cultos/reserve/gin_z_yoyaku?c=A&t=0900">○</a></td>
    <td>×</td><td>×</td>
    <td><a href=" ">○</a></td>
    <td>－</td>
    <td>○</td>
  </tr>
  <tr><td>備考</td><td colspan="6">雨天中止</td></tr>
  <tr>
    <td>柳島しおさい公園 1コート</td>
    <td>×</td><td>×</td><td>×</td><td>×</td><td>×</td>
    <td><a href="/cultos/reserve/gin_z_yoyaku?c=S1&t=1900">○</a></td>
  </tr>
</table></body></html>"#;

#[test]
fn test_court_table() {
    let entries = extract_slots(COURT_TABLE, "20250614");
    assert_eq!(entries.len(), 2);

    let park = &entries[0];
    assert_eq!(park.facility_name, "茅ヶ崎公園庭球場 Aコート");
    assert_eq!(park.area(), FacilityArea::ChigasakiPark);
    assert_eq!(park.slots.len(), 6);

    let first = &park.slots[0];
    assert_eq!(first.clock_time, "9:00");
    assert_eq!(first.band, TimeBand::Morning);
    assert!(first.is_open);
    assert_eq!(
        first.action_ref.as_deref(),
        Some("/cultos/reserve/gin_z_yoyaku?c=A&t=0900")
    );

    assert!(!park.slots[1].is_open);
    assert!(park.slots[3].is_open);
    assert_eq!(park.slots[3].action_ref, None);
    assert!(!park.slots[4].is_open);
    assert!(park.slots[5].is_open);
    assert_eq!(park.slots[5].band, TimeBand::Night);

    let shiosai = &entries[1];
    assert_eq!(shiosai.area(), FacilityArea::YanagishimaShiosaiPark);
    assert_eq!(shiosai.open_slots().count(), 1);
}

#[test]
fn test_page_without_table() {
    assert!(extract_slots("<html><body><p>メンテナンス中</p></body></html>", "20250614").is_empty());
}

#[test]
fn test_held_list_screen() {
    let html = r#"<html><body><table>
      <tr><th>利用日時</th><th>施設</th><th>状態</th></tr>
      <tr>
        <td><a href="/cultos/reserve/gin_s_yykshosai?ymd=20250614&no=1">2025年6月14日(土) 9:00〜11:00</a></td>
        <td>茅ヶ崎公園庭球場 Aコート</td><td>予約済</td>
      </tr>
      <tr>
        <td><a href="/cultos/reserve/gin_s_yykshosai?no=2">2025年6月15日(日) 13:00〜15:00</a></td>
        <td>柳島スポーツ公園 2コート</td><td>予約済</td>
      </tr>
      <tr><td>合計 1 件</td></tr>
    </table></body></html>"#;

    let held = held_reservations(html);
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].date, "20250614");
    assert_eq!(held[0].facility_name, "茅ヶ崎公園庭球場 Aコート");
    assert_eq!(held[0].slots[0].clock_time, "9:00");
    assert_eq!(held[0].slots[0].band, TimeBand::Morning);
}

#[test]
fn test_calendar_and_month_screens() {
    let calendar = r#"<html><body><table id="MonthTbl"><tr>
      <td>5月</td>
      <td><a href="/cultos/reserve/gin_z_month?u_hyojiym=202506">6月</a></td>
      <td><a href="/cultos/reserve/gin_z_month?u_hyojiym=202507">7月</a></td>
    </tr></table></body></html>"#;
    assert_eq!(
        active_month_links(calendar),
        vec![
            "/cultos/reserve/gin_z_month?u_hyojiym=202506",
            "/cultos/reserve/gin_z_month?u_hyojiym=202507",
        ]
    );

    // June 2025: the 4th is a Wednesday, the 7th a Saturday
    let month = r#"<html><body><table class="link-table"><tr>
      <td><a href="/d?ymd=20250604">4</a></td>
      <td><a href="/d?ymd=20250605">5</a></td>
      <td><a href="/d?ymd=20250607">7</a></td>
      <td>8</td>
      <td><a href="/d?ymd=">日</a></td>
    </tr></table></body></html>"#;
    let days = day_links(
        month,
        "/cultos/reserve/gin_z_month?u_hyojiym=202506",
        &[Weekday::Wed, Weekday::Sat, Weekday::Sun],
    );
    assert_eq!(days, vec!["/d?ymd=20250604", "/d?ymd=20250607"]);
}

#[test]
fn test_purpose_and_booking_screens() {
    let frame = r#"<a href="/p?k=1">テニス（ナイター）</a><a href="/p?k=2"> テニス </a>"#;
    assert_eq!(purpose_link(frame, "テニス").as_deref(), Some("/p?k=2"));
    assert_eq!(purpose_link(frame, "野球"), None);

    let page = r#"<form name="search"><input name="q" value="x"></form>
      <form name="form_nm" action="/cultos/reserve/gin_z_kakutei">
        <input type="hidden" name="u_riyosha" value="12345">
        <input type="hidden" name="u_memo" >
        <input type="button" value="戻る">
      </form>"#;
    let form = booking_form(page, "form_nm").unwrap();
    assert_eq!(form.action, "/cultos/reserve/gin_z_kakutei");
    assert_eq!(
        form.fields,
        vec![
            ("u_riyosha".to_string(), "12345".to_string()),
            ("u_memo".to_string(), String::new()),
        ]
    );
    assert!(booking_form(page, "missing").is_none());
}
