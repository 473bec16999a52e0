// src/visualize/wordcloud.rs

//! Frequency-weighted word clouds.

use std::collections::HashMap;
use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};

const MIN_FONT_SIZE: f64 = 12.0;
const MAX_FONT_SIZE: f64 = 72.0;
const MIN_WORD_CHARS: usize = 3;

/// Approximate glyph width relative to font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "her", "here", "hers", "herself", "him", "himself", "his", "how", "into", "its",
    "itself", "just", "more", "most", "not", "now", "off", "once", "only", "other", "our",
    "ours", "out", "over", "own", "same", "she", "should", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "then", "there", "these", "they", "this", "those", "through",
    "too", "under", "until", "very", "was", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
];

/// A word placed on the cloud canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub x: i32,
    pub y: i32,
    pub font_size: f64,
}

/// Count word frequencies across `texts`, most frequent first.
///
/// Texts are joined with single spaces, lower-cased and split into Unicode
/// words. Stop words, numbers and words shorter than three characters are
/// dropped. Ties are ordered alphabetically.
pub fn word_frequencies<S: AsRef<str>>(texts: &[S]) -> Vec<(String, usize)> {
    let joined = texts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in joined.unicode_words() {
        if word.chars().count() < MIN_WORD_CHARS
            || word.chars().all(|c| c.is_numeric())
            || STOP_WORDS.contains(&word)
        {
            continue;
        }
        *counts.entry(word).or_default() += 1;
    }

    let mut freqs: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(w, c)| (w.to_string(), c))
        .collect();
    freqs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    freqs
}

/// Lay words out in rows, largest first, until the canvas is full.
///
/// Font size scales linearly with frequency relative to the most frequent
/// word. Words that would overflow the bottom edge are left out.
pub fn layout_words(freqs: &[(String, usize)], width: u32, height: u32) -> Vec<PlacedWord> {
    let Some(max_count) = freqs.iter().map(|(_, c)| *c).max() else {
        return Vec::new();
    };
    let (width, height) = (f64::from(width), f64::from(height));

    let mut placed = Vec::new();
    let mut x = 0.0;
    let mut y = 0.0;
    let mut row_height: f64 = 0.0;

    for (word, count) in freqs {
        let scale = *count as f64 / max_count as f64;
        let font_size = MIN_FONT_SIZE + (MAX_FONT_SIZE - MIN_FONT_SIZE) * scale;
        let word_width = font_size * GLYPH_WIDTH_RATIO * word.chars().count() as f64;
        if word_width > width {
            continue;
        }

        if x + word_width > width {
            x = 0.0;
            y += row_height;
            row_height = 0.0;
        }
        if y + font_size > height {
            break;
        }

        placed.push(PlacedWord {
            word: word.clone(),
            x: x as i32,
            y: y as i32,
            font_size,
        });
        x += word_width + font_size * GLYPH_WIDTH_RATIO;
        row_height = row_height.max(font_size * 1.2);
    }
    placed
}

/// Build a word cloud from `texts` and save it as a PNG.
pub fn render_word_cloud<S: AsRef<str>>(
    texts: &[S],
    output: &Path,
    width: u32,
    height: u32,
    max_words: usize,
) -> Result<()> {
    let mut freqs = word_frequencies(texts);
    freqs.truncate(max_words);
    if freqs.is_empty() {
        return Err(AppError::render("word cloud needs at least one word"));
    }

    let words = layout_words(&freqs, width, height);

    let root = BitMapBackend::new(output, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(AppError::render)?;
    for (i, placed) in words.iter().enumerate() {
        let style = ("sans-serif", placed.font_size)
            .into_font()
            .color(&PALETTE[i % PALETTE.len()])
            .pos(Pos::new(HPos::Left, VPos::Top));
        root.draw(&Text::new(placed.word.clone(), (placed.x, placed.y), style))
            .map_err(AppError::render)?;
    }
    root.present().map_err(AppError::render)?;

    log::info!(
        "Saved word cloud with {} words to {}",
        words.len(),
        output.display()
    );
    Ok(())
}
