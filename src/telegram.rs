//! Telegram delivery transport.
//!
//! One outbound `sendPhoto` call per article: the lead image as the photo,
//! a Markdown caption built from category, title, and excerpt, and a
//! randomly picked promotional footer pointing readers at the channel.
//!
//! The [`Transport`] trait is the seam the delivery queue tests against; a
//! scripted implementation stands in for Telegram there.

use std::error::Error;
use std::time::Duration;

use rand::Rng;
use thiserror::Error as ThisError;
use tracing::warn;

use crate::models::QueuedItem;

/// Telegram allows sendPhoto captions up to 1024 characters; the body is
/// capped below that to leave room for the header and footer.
const CAPTION_BODY_LIMIT: usize = 900;

const EMOJI: [&str; 13] = [
    "😊", "😏", "👌", "👍", "👀", "😸", "😁", "😃", "😇", "😎", "🚀", "✌", "🙌",
];

const MESSAGE_ENDINGS: [&str; 22] = [
    "[Подписывайся! У нас только хорошие новости!](t.me/nomoredoomscrolling)",
    "[Жми сюда, если надоел Doom Scrolling](t.me/nomoredoomscrolling)",
    "[Если понравилось, заходи. У нас есть ещё!](t.me/nomoredoomscrolling)",
    "[Ждём тебя на нашем канале!](t.me/nomoredoomscrolling)",
    "[Не упусти свою порцию позитива!](t.me/nomoredoomscrolling)",
    "[Брось Doom Scrolling и присоединяйся!](t.me/nomoredoomscrolling)",
    "[У нас всегда только светлая сторона новостей!](t.me/nomoredoomscrolling)",
    "[Забудь о плохих новостях на нашем канале!](t.me/nomoredoomscrolling)",
    "[Больше хороших новостей на нашем канале!](t.me/nomoredoomscrolling)",
    "[С нами ты всегда найдёшь причину улыбнуться!](t.me/nomoredoomscrolling)",
    "[Подними себе настроение на нашем канале!](t.me/nomoredoomscrolling)",
    "[Позитивные истории ждут тебя! Присоединяйся!](t.me/nomoredoomscrolling)",
    "[Подписывайся на лучший канал новостей!](t.me/nomoredoomscrolling)",
    "[Ищешь хорошие новости? Тебе сюда!](t.me/nomoredoomscrolling)",
    "[Присоединяйся и делай мир ярче вместе с нами!](t.me/nomoredoomscrolling)",
    "[Вместе мы сделаем этот мир лучше!](t.me/nomoredoomscrolling)",
    "[Лучшие новости каждый день - только у нас!](t.me/nomoredoomscrolling)",
    "[Поделись позитивом с друзьями!](t.me/nomoredoomscrolling)",
    "[Жми на кнопку подписки и получай дозу счастья!](t.me/nomoredoomscrolling)",
    "[Не упусти возможность улучшить свой день!](t.me/nomoredoomscrolling)",
    "[Подписка на счастье всего в одном клике!](t.me/nomoredoomscrolling)",
    "[Новости, которые поднимут настроение!](t.me/nomoredoomscrolling)",
];

/// Why a single article could not be delivered.
///
/// Carries the article id in every variant so the delivery log can name
/// the row that stays unsent.
#[derive(Debug, ThisError)]
pub enum SendError {
    /// The HTTP request itself failed (network error, timeout).
    #[error("sendPhoto request for item id {id} failed: {source}")]
    Request {
        id: i64,
        #[source]
        source: reqwest::Error,
    },
    /// Telegram answered with a non-success status.
    #[error("sendPhoto request for item id {id} returned status {status}")]
    Status { id: i64, status: u16 },
}

/// Outbound messaging capability, one call per article.
pub trait Transport {
    /// Send one article's photo + caption to the destination channel.
    async fn send(&self, item: &QueuedItem) -> Result<(), SendError>;
}

/// The production transport: Telegram Bot API `sendPhoto`.
pub struct TelegramTransport {
    api_key: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramTransport {
    /// Build the transport from `API_KEY` and `CHAT_ID` in the
    /// environment.
    pub fn from_env(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let api_key = std::env::var("API_KEY")?;
        let chat_id = std::env::var("CHAT_ID")?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            chat_id,
            client,
        })
    }
}

impl Transport for TelegramTransport {
    async fn send(&self, item: &QueuedItem) -> Result<(), SendError> {
        let caption = assemble_caption(item, CAPTION_BODY_LIMIT, false, &mut rand::rng());
        let request_url = format!(
            "https://api.telegram.org/bot{}/sendPhoto?chat_id={}&photo={}&caption={}&parse_mode=Markdown",
            self.api_key, self.chat_id, item.image, caption
        );

        let response = self
            .client
            .get(&request_url)
            .send()
            .await
            .map_err(|source| SendError::Request { id: item.id, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(id = item.id, status = %status, body = %body, "sendPhoto was rejected");
            return Err(SendError::Status {
                id: item.id,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Build the percent-encoded caption for one article.
///
/// Layout: bold `category: title` header, the excerpt body capped at
/// `max_body` characters, an optional posted-timestamp line, and a random
/// footer. Triple newlines left by empty fields collapse to double.
pub(crate) fn assemble_caption<R: Rng + ?Sized>(
    item: &QueuedItem,
    max_body: usize,
    include_posted: bool,
    rng: &mut R,
) -> String {
    let body = truncate_chars(&item.excerpt, max_body);
    let posted_line = if include_posted {
        format!("{}\n\n", item.posted)
    } else {
        String::new()
    };

    let caption = format!(
        "*{}: {}*\n\n{}\n\n{}{}",
        item.category,
        item.title,
        body,
        posted_line,
        pick_footer(rng)
    );
    let caption = caption.replace("\n\n\n", "\n\n");

    urlencoding::encode(&caption).into_owned()
}

/// Pick the promotional footer: a random emoji and a random channel-promo
/// line. Pure over the injected RNG.
pub(crate) fn pick_footer<R: Rng + ?Sized>(rng: &mut R) -> String {
    let emoji = EMOJI[rng.random_range(0..EMOJI.len())];
    let ending = MESSAGE_ENDINGS[rng.random_range(0..MESSAGE_ENDINGS.len())];
    format!("{emoji} {ending}")
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn item(excerpt: &str) -> QueuedItem {
        QueuedItem {
            id: 1,
            category: "Наука".to_string(),
            posted: "01-03-2024 10:15:30".to_string(),
            title: "Заголовок".to_string(),
            image: "https://cdn.example/lead.jpg".to_string(),
            excerpt: excerpt.to_string(),
        }
    }

    fn decoded(caption: &str) -> String {
        urlencoding::decode(caption).unwrap().into_owned()
    }

    #[test]
    fn test_footer_deterministic_under_seed() {
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let footer = pick_footer(&mut a);
        assert_eq!(footer, pick_footer(&mut b));
        assert!(footer.contains("t.me/nomoredoomscrolling"));
    }

    #[test]
    fn test_caption_header_and_body() {
        let mut rng = StdRng::seed_from_u64(3);
        let caption = assemble_caption(&item("Первый абзац."), 900, false, &mut rng);
        let plain = decoded(&caption);
        assert!(plain.starts_with("*Наука: Заголовок*\n\nПервый абзац.\n\n"));
        assert!(plain.contains("t.me/nomoredoomscrolling"));
        assert!(!plain.contains("01-03-2024"));
    }

    #[test]
    fn test_caption_includes_posted_when_asked() {
        let mut rng = StdRng::seed_from_u64(3);
        let caption = assemble_caption(&item("Текст."), 900, true, &mut rng);
        assert!(decoded(&caption).contains("01-03-2024 10:15:30"));
    }

    #[test]
    fn test_caption_body_capped_at_char_boundary() {
        let long = "д".repeat(2000);
        let mut rng = StdRng::seed_from_u64(3);
        let caption = assemble_caption(&item(&long), 900, false, &mut rng);
        let plain = decoded(&caption);
        assert!(plain.contains(&"д".repeat(900)));
        assert!(!plain.contains(&"д".repeat(901)));
    }

    #[test]
    fn test_caption_is_percent_encoded() {
        let mut rng = StdRng::seed_from_u64(3);
        let caption = assemble_caption(&item("a b"), 900, false, &mut rng);
        assert!(!caption.contains(' '));
        assert!(!caption.contains('\n'));
        assert!(caption.contains("%20"));
    }

    #[test]
    fn test_empty_excerpt_collapses_blank_lines() {
        let mut rng = StdRng::seed_from_u64(3);
        let caption = assemble_caption(&item(""), 900, false, &mut rng);
        assert!(!decoded(&caption).contains("\n\n\n\n"));
    }
}
