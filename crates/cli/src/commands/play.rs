//! Interactive session.
//!
//! Each input line becomes one state-machine event, the same ones a
//! graphical front end would send. Type `help` for the command list.

use std::path::PathBuf;
use std::str::FromStr;

use paw_fortune_app::card::CardRenderer;
use paw_fortune_app::config::AppConfig;
use paw_fortune_app::gemini::GeminiClient;
use paw_fortune_app::storage::FileStore;
use paw_fortune_app::{AppError, Clock, Controller, Event, Persistence, SystemClock, View};
use paw_fortune_core::{ChineseZodiac, ProfileForm};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::display;

const HELP: &str = "\
open             开盲盒
tap              点击错误提示
reset            再抽一次
select <N>       查看第 N 个收藏
next / prev      翻动侧边栏
gallery / home   切换页面
sort             切换收藏排序
profile [M D Z]  设置档案 (月 日 生肖)，不带参数则打开表单
cancel           关闭档案表单
export [DIR]     导出当前卡片为 PNG
quit             退出";

/// Errors from parsing one input line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("missing argument: {0}")]
    Missing(&'static str),

    #[error("invalid {what}: {value}")]
    Invalid { what: &'static str, value: String },
}

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Open,
    Tap,
    Reset,
    Select(usize),
    Next,
    Prev,
    Gallery,
    Home,
    Sort,
    Profile(Option<ProfileForm>),
    Cancel,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Help);
        };
        let command = match name.to_ascii_lowercase().as_str() {
            "open" | "o" => Self::Open,
            "tap" | "t" => Self::Tap,
            "reset" | "r" => Self::Reset,
            "select" | "s" => {
                let raw = words.next().ok_or(InputError::Missing("N"))?;
                let position = raw.parse().map_err(|_| InputError::Invalid {
                    what: "position",
                    value: raw.to_owned(),
                })?;
                Self::Select(position)
            }
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "gallery" | "g" => Self::Gallery,
            "home" | "h" => Self::Home,
            "sort" => Self::Sort,
            "profile" => match (words.next(), words.next(), words.next()) {
                (None, _, _) => Self::Profile(None),
                (Some(month), Some(day), Some(animal)) => {
                    let chinese_zodiac: ChineseZodiac =
                        animal.parse().map_err(|_| InputError::Invalid {
                            what: "chinese zodiac",
                            value: animal.to_owned(),
                        })?;
                    Self::Profile(Some(ProfileForm {
                        month: month.to_owned(),
                        day: day.to_owned(),
                        chinese_zodiac,
                        ..ProfileForm::default()
                    }))
                }
                (Some(_), None, _) => return Err(InputError::Missing("day")),
                (Some(_), Some(_), None) => return Err(InputError::Missing("chinese zodiac")),
            },
            "cancel" => Self::Cancel,
            "export" | "e" => Self::Export(words.next().map(PathBuf::from)),
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(InputError::Unknown(other.to_owned())),
        };
        Ok(command)
    }
}

/// Run the session until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if setup fails or stdin cannot be read.
pub async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let client = GeminiClient::new(&config.gemini)?;
    let store = FileStore::open(&config.store)?;
    let renderer = CardRenderer::new(config.font_path.as_deref())?;

    let mut controller = Controller::new(Persistence::new(store), client, config.shake_delay)
        .with_observer(display::state);

    display::notice(HELP);
    display::screen(controller.session());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                display::error(&e.to_string());
                continue;
            }
        };

        let report = match command {
            Command::Quit => break,
            Command::Help => {
                display::notice(HELP);
                continue;
            }
            Command::Open => controller.click().await,
            Command::Tap => controller.dispatch(Event::ErrorTapped).await,
            Command::Reset => controller.dispatch(Event::Reset).await,
            Command::Select(position) => {
                let Some(index) = position.checked_sub(1) else {
                    display::error("positions start at 1");
                    continue;
                };
                controller.dispatch(Event::HistorySelected(index)).await
            }
            Command::Next => controller.dispatch(Event::SidebarNext).await,
            Command::Prev => controller.dispatch(Event::SidebarPrev).await,
            Command::Gallery => controller.dispatch(Event::ViewChanged(View::Collection)).await,
            Command::Home => controller.dispatch(Event::ViewChanged(View::Home)).await,
            Command::Sort => controller.dispatch(Event::GalleryOrderToggled).await,
            Command::Profile(None) => controller.dispatch(Event::ProfilePromptOpened).await,
            Command::Profile(Some(form)) => match form.submit() {
                Ok(profile) => controller.dispatch(Event::ProfileSaved(profile)).await,
                Err(e) => {
                    display::error(&e.to_string());
                    continue;
                }
            },
            Command::Cancel => controller.dispatch(Event::ProfilePromptClosed).await,
            Command::Export(dir) => {
                export_current(&controller, &renderer, dir);
                continue;
            }
        };

        display::report(controller.session(), &report);
        display::screen(controller.session());
    }

    Ok(())
}

fn export_current(
    controller: &Controller<FileStore, GeminiClient, SystemClock>,
    renderer: &CardRenderer,
    dir: Option<PathBuf>,
) {
    let Some(fortune) = controller.session().current() else {
        display::error("没有可导出的卡片");
        return;
    };
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    match renderer.export(fortune, &dir, controller.persistence().clock().now()) {
        Ok(path) => display::notice(&format!("📸 {}", path.display())),
        Err(e) => {
            tracing::error!(error = %e, "Card export failed");
            display::error(&e.to_string());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("open".parse::<Command>().unwrap(), Command::Open);
        assert_eq!(" TAP ".parse::<Command>().unwrap(), Command::Tap);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("".parse::<Command>().unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_select() {
        assert_eq!("select 2".parse::<Command>().unwrap(), Command::Select(2));
        assert_eq!(
            "select".parse::<Command>().unwrap_err(),
            InputError::Missing("N")
        );
        assert!(matches!(
            "select two".parse::<Command>(),
            Err(InputError::Invalid { what: "position", .. })
        ));
    }

    #[test]
    fn test_parse_profile() {
        assert_eq!("profile".parse::<Command>().unwrap(), Command::Profile(None));

        let Command::Profile(Some(form)) = "profile 2 29 龙".parse::<Command>().unwrap() else {
            panic!("expected a profile form");
        };
        assert_eq!(form.chinese_zodiac, ChineseZodiac::Dragon);
        assert!(form.submit().is_ok());

        let Command::Profile(Some(form)) = "profile 2 30 dragon".parse::<Command>().unwrap()
        else {
            panic!("expected a profile form");
        };
        assert!(form.submit().is_err());

        assert_eq!(
            "profile 2".parse::<Command>().unwrap_err(),
            InputError::Missing("day")
        );
        assert!(matches!(
            "profile 2 3 unicorn".parse::<Command>(),
            Err(InputError::Invalid { what: "chinese zodiac", .. })
        ));
    }

    #[test]
    fn test_parse_export_dir() {
        assert_eq!("export".parse::<Command>().unwrap(), Command::Export(None));
        assert_eq!(
            "export cards".parse::<Command>().unwrap(),
            Command::Export(Some(PathBuf::from("cards")))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "dance".parse::<Command>().unwrap_err().to_string(),
            "unknown command: dance (try `help`)"
        );
    }
}
