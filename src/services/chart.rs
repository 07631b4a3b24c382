use futures::future::join_all;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{error, info};

use crate::components::Reply;
use crate::constants::{CHART_HEIGHT, CHART_WIDTH, MAX_CHARTS_PER_BATCH};
use crate::errors::{BotError, Result};
use crate::utils::{bold, escape_markdown, format_compact, format_usd};
use super::types::{DiscoveryCoin, Pairing, TimeFrame};

const MARGIN: u32 = 24;
const POINTS: usize = 60;
const BACKGROUND: Rgb<u8> = Rgb([18, 22, 33]);
const GRID: Rgb<u8> = Rgb([44, 50, 66]);
const RISING: Rgb<u8> = Rgb([38, 166, 154]);
const FALLING: Rgb<u8> = Rgb([239, 83, 80]);

/// Renders mock price charts as PNG.
#[derive(Debug, Clone, Default)]
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Render off the async runtime.
    pub async fn generate_chart(
        &self,
        name: &str,
        pairing: Pairing,
        timeframe: TimeFrame,
    ) -> Result<Vec<u8>> {
        let name = name.to_string();
        tokio::task::spawn_blocking(move || render_chart(&name, pairing, timeframe))
            .await
            .map_err(|e| BotError::Chart(e.to_string()))?
    }

    /// One photo per coin, capped at [`MAX_CHARTS_PER_BATCH`]. A failed chart becomes a notice.
    pub async fn discovery_batch(
        &self,
        coins: &[DiscoveryCoin],
        pairing: Pairing,
        timeframe: TimeFrame,
        extra: Option<&str>,
    ) -> Vec<Reply> {
        let coins = &coins[..coins.len().min(MAX_CHARTS_PER_BATCH)];
        info!("Rendering {} discovery charts", coins.len());

        let charts = join_all(
            coins
                .iter()
                .map(|coin| self.generate_chart(&coin.name, pairing, timeframe)),
        )
        .await;

        let mut replies = Vec::with_capacity(coins.len());
        for (coin, chart) in coins.iter().zip(charts) {
            match chart {
                Ok(png) => replies.push(Reply::Photo {
                    png,
                    caption: discovery_caption(coin, pairing, timeframe, extra),
                    keyboard: Some(coin_actions(&coin.id)),
                }),
                Err(e) => {
                    error!("Error generating chart for {}: {}", coin.name, e);
                    replies.push(Reply::notice(format!("❌ Error generating chart for {}", coin.name)));
                }
            }
        }

        replies
    }
}

/// "View Chart" and "Add to Watchlist" buttons for a coin.
pub fn coin_actions(coin_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("📈 View Chart", format!("chart_{}", coin_id)),
        InlineKeyboardButton::callback("⭐ Add to Watchlist", format!("watchlist_add_{}", coin_id)),
    ]])
}

fn discovery_caption(coin: &DiscoveryCoin, pairing: Pairing, timeframe: TimeFrame, extra: Option<&str>) -> String {
    let mut caption = format!(
        "📊 {}\nScore: `{:.2}`\n{}\n{}\n",
        bold(&format!("{} ({})", coin.name, coin.symbol)),
        coin.trend_score,
        escape_markdown(&format!(
            "Price: {} | Vol: {} | MCap: {}",
            format_usd(coin.price),
            format_compact(coin.volume_24h),
            format_compact(coin.market_cap)
        )),
        escape_markdown(&format!("Pair: {} | TF: {}", pairing, timeframe.label())),
    );
    if let Some(extra) = extra {
        caption.push('\n');
        caption.push_str(&escape_markdown(extra));
    }
    caption
}

fn seed_for(name: &str, pairing: Pairing, timeframe: TimeFrame) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    pairing.hash(&mut hasher);
    timeframe.hash(&mut hasher);
    hasher.finish()
}

/// Random walk line chart, deterministic per coin, pairing and timeframe.
pub fn render_chart(name: &str, pairing: Pairing, timeframe: TimeFrame) -> Result<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed_for(name, pairing, timeframe));
    let mut image = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);

    for y in (MARGIN..CHART_HEIGHT - MARGIN).step_by(48) {
        draw_line(&mut image, (MARGIN as i64, y as i64), ((CHART_WIDTH - MARGIN) as i64, y as i64), GRID);
    }
    for x in (MARGIN..CHART_WIDTH - MARGIN).step_by(64) {
        draw_line(&mut image, (x as i64, MARGIN as i64), (x as i64, (CHART_HEIGHT - MARGIN) as i64), GRID);
    }

    let mut price = 100.0f64;
    let series: Vec<f64> = (0..POINTS)
        .map(|_| {
            price *= 1.0 + rng.gen_range(-0.04..0.04);
            price
        })
        .collect();

    let (min, max) = series
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = (max - min).max(f64::EPSILON);
    let plot_w = (CHART_WIDTH - 2 * MARGIN) as f64;
    let plot_h = (CHART_HEIGHT - 2 * MARGIN) as f64;

    let points: Vec<(i64, i64)> = series
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = MARGIN as f64 + plot_w * i as f64 / (POINTS - 1) as f64;
            let y = MARGIN as f64 + plot_h * (1.0 - (v - min) / span);
            (x.round() as i64, y.round() as i64)
        })
        .collect();

    let color = match (series.first(), series.last()) {
        (Some(first), Some(last)) if last < first => FALLING,
        _ => RISING,
    };
    for pair in points.windows(2) {
        draw_line(&mut image, pair[0], pair[1], color);
        draw_line(&mut image, (pair[0].0, pair[0].1 + 1), (pair[1].0, pair[1].1 + 1), color);
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| BotError::Chart(e.to_string()))?;
    Ok(bytes)
}

// Bresenham, clipped to the image bounds
fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.put_pixel(x as u32, y as u32, color);
        }
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
