//! Capture timeline charts and word clouds.

mod monthly;
mod wordcloud;

pub use monthly::{MonthlyCount, january_ticks, monthly_counts, plot_monthly_captures};
pub use wordcloud::{PlacedWord, layout_words, render_word_cloud, word_frequencies};
