//! Terminal rendering of the box, cards, profile and collection.

#![allow(clippy::print_stdout)]

use paw_fortune_app::card::card_date;
use paw_fortune_app::{AppState, Report, SaveOutcome, Session, View};
use paw_fortune_core::{Collection, DailyUsage, GeneratedFortune, UserProfile};

const MAX_PERSISTED: usize = Collection::PERSIST_TIERS[0];
const RULE: &str = "────────────────────────────────────────";

/// One line per state change while a box opens.
pub fn state(session: &Session) {
    println!("{}", state_line(session.state(), session.status_text()));
}

fn state_line(state: AppState, caption: &str) -> String {
    let icon = match state {
        AppState::Idle => "📦",
        AppState::Shaking => "🫨",
        AppState::GeneratingText => "🔮",
        AppState::GeneratingImage => "🖨️",
        AppState::Revealed => "🎁",
        AppState::Error => "⚠️",
    };
    format!("{icon} [{state}] {caption}")
}

/// Full result card.
pub fn fortune(fortune: &GeneratedFortune) {
    println!("{}", card_text(fortune));
}

fn card_text(fortune: &GeneratedFortune) -> String {
    let data = &fortune.data;
    [
        RULE.to_string(),
        format!(
            "{} {}  [{}]",
            data.animal.emoji(),
            data.title,
            data.rarity.label_zh()
        ),
        format!("抽到了：{}", data.action_description),
        format!("✨ {}", data.fortune_quote),
        format!("🏷  {}", data.base_label),
        format!("🖼  {}", image_summary(&fortune.image_url)),
        format!("📅 {}", card_date(fortune.timestamp)),
        RULE.to_string(),
    ]
    .join("\n")
}

fn image_summary(uri: &str) -> String {
    let Some(rest) = uri.strip_prefix("data:") else {
        return "(no image)".to_string();
    };
    match rest.split_once(";base64,") {
        Some((mime, payload)) => format!("{mime}, ~{} KiB", payload.len() * 3 / 4 / 1024),
        None => "(unreadable image)".to_string(),
    }
}

/// Compact listing entry.
fn summary_line(position: usize, fortune: &GeneratedFortune) -> String {
    format!(
        "{position:>3}. {} {} [{}] {}",
        fortune.data.animal.emoji(),
        fortune.data.title,
        fortune.data.rarity.label_zh(),
        card_date(fortune.timestamp)
    )
}

/// Listing with 1-based positions in collection order (newest first).
pub fn listing<'a>(items: impl IntoIterator<Item = (usize, &'a GeneratedFortune)>) {
    let mut empty = true;
    for (index, fortune) in items {
        empty = false;
        println!("{}", summary_line(index + 1, fortune));
    }
    if empty {
        println!("还没有收藏，快去开盲盒吧！");
    }
}

pub fn profile(profile: Option<&UserProfile>) {
    println!("{}", profile_text(profile));
}

fn profile_text(profile: Option<&UserProfile>) -> String {
    let Some(profile) = profile else {
        return "尚未设置档案".to_string();
    };
    let birthday = profile
        .birthday()
        .map_or_else(|| "未填写".to_string(), |b| format!("{}月{}日", b.month(), b.day()));
    format!(
        "生日: {birthday}\n星座: {} ({})\n生肖: {} ({})",
        profile.zodiac.label_zh(),
        profile.zodiac.name(),
        profile.chinese_zodiac.label_zh(),
        profile.chinese_zodiac.name(),
    )
}

/// Shown when a click needs a profile first.
pub fn profile_prompt(in_session: bool) {
    println!("🐾 先告诉我们你的生日和生肖吧！");
    if in_session {
        println!("   输入: profile <月> <日> <生肖>，或 cancel 关闭");
    } else {
        println!("   运行: paw-fortune profile set --month <月> --day <日> --chinese-zodiac <生肖>");
    }
}

pub fn usage(usage: &DailyUsage) {
    println!(
        "{}: 已抽 {}/{}，剩余 {}",
        usage.date,
        usage.count,
        DailyUsage::LIMIT,
        usage.remaining()
    );
}

pub fn error(message: &str) {
    println!("❌ {message}");
}

pub fn notice(message: &str) {
    println!("{message}");
}

/// Mention when the store could not hold everything.
pub fn saved(outcome: SaveOutcome, collection_len: usize) {
    match outcome {
        SaveOutcome::Dropped => println!("(本地空间不足，收藏未能保存)"),
        SaveOutcome::Stored { items, .. } if items < collection_len.min(MAX_PERSISTED) => {
            println!("(本地空间不足，仅保存了最近 {items} 条)");
        }
        SaveOutcome::Stored { .. } => {}
    }
}

/// Notices and storage warnings from one dispatched event.
pub fn report(session: &Session, report: &Report) {
    for message in &report.notices {
        notice(message);
    }
    if let Some(outcome) = report.saved {
        saved(outcome, session.collection().len());
    }
}

/// Everything the current view shows, for the interactive session.
pub fn screen(session: &Session) {
    match session.view() {
        View::Home => home(session),
        View::Collection => gallery(session),
    }
}

fn home(session: &Session) {
    println!("{RULE}");
    println!("{}", state_line(session.state(), session.status_text()));
    if let Some(message) = session.error() {
        error(message);
    }
    if let Some(current) = session.current() {
        fortune(current);
    }
    if session.profile_prompt_open() {
        profile_prompt(true);
    }
    sidebar(session);
}

fn sidebar(session: &Session) {
    let window = session.sidebar();
    let collection = session.collection();
    if collection.is_empty() {
        return;
    }
    println!("收藏 {}", if window.can_prev() { "▲ (prev)" } else { "" });
    for (index, fortune) in window.visible(collection) {
        println!("{}", summary_line(index + 1, fortune));
    }
    if window.can_next(collection.len()) {
        println!("▼ (next)");
    }
}

fn gallery(session: &Session) {
    let order = session.gallery_order();
    println!("{RULE}");
    println!("我的收藏 ({} 条) · 排序: {}", session.collection().len(), order.label_zh());
    let collection = session.collection();
    let sorted = collection.sorted(order);
    let positioned = sorted.into_iter().filter_map(|fortune| {
        collection
            .iter()
            .position(|item| std::ptr::eq(item, fortune))
            .map(|index| (index, fortune))
    });
    listing(positioned);
}
