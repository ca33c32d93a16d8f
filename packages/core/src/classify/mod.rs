//! Category Suggestion
//!
//! A keyword-scoring heuristic that proposes a post category while the
//! author writes. Scoring counts every non-overlapping occurrence of every
//! keyword over the lowercased plain text, so a post that mentions running
//! three times outscores one food reference. Pure and deterministic: the
//! same text always yields the same suggestion.

use serde::{Deserialize, Serialize};

use crate::utils::strip_markdown;

/// Minimum plain-text length before a suggestion is offered
pub const SUGGESTION_THRESHOLD: usize = 50;

/// The fixed category set. `Daily` is the default and the fallback when no
/// keyword matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    #[default]
    Daily,
    Dev,
    Exercise,
    Reading,
    Travel,
    Food,
}

impl Category {
    /// Stable identifier used in persisted drafts
    pub fn id(&self) -> &'static str {
        match self {
            Category::Daily => "daily",
            Category::Dev => "dev",
            Category::Exercise => "exercise",
            Category::Reading => "reading",
            Category::Travel => "travel",
            Category::Food => "food",
        }
    }

    /// All categories in declaration order (the tie-break order)
    pub fn all() -> &'static [Category] {
        &[
            Category::Daily,
            Category::Dev,
            Category::Exercise,
            Category::Reading,
            Category::Travel,
            Category::Food,
        ]
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Daily => &[],
            Category::Dev => &[
                "개발", "코딩", "코드", "배포", "버그", "리팩토링", "알고리즘", "프로그래밍",
                "서버", "프론트엔드", "백엔드", "데이터베이스", "code", "coding", "deploy",
                "bug", "refactor", "algorithm", "api", "database", "rust", "typescript",
            ],
            Category::Exercise => &[
                "운동", "러닝", "스쿼트", "헬스", "요가", "달리기", "근력", "유산소", "스트레칭",
                "푸시업", "workout", "running", "squat", "gym", "yoga", "cardio", "stretching",
            ],
            Category::Reading => &[
                "독서", "책", "소설", "서평", "작가", "문장", "챕터", "도서관", "reading",
                "book", "novel", "author", "chapter", "library",
            ],
            Category::Travel => &[
                "여행", "공항", "호텔", "비행기", "관광", "숙소", "배낭", "항공권", "travel",
                "airport", "hotel", "flight", "sightseeing", "backpack",
            ],
            Category::Food => &[
                "맛집", "요리", "레시피", "식당", "메뉴", "디저트", "카페", "맛있", "저녁",
                "점심", "recipe", "restaurant", "dessert", "cafe", "delicious", "dinner",
                "lunch",
            ],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A suggestion offered to the author. Ephemeral: `triggered_at` records
/// the plain-text length at which it fired, so callers can tell whether
/// the content has moved on since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCategory {
    pub category: Category,
    pub triggered_at: usize,
}

/// Score plain text against every category's keyword list and return the
/// best match; `Daily` when nothing matches. Ties resolve in declaration
/// order.
pub fn suggest_category(text: &str) -> Category {
    let haystack = text.to_lowercase();
    let mut best = Category::Daily;
    let mut best_score = 0usize;
    for category in Category::all() {
        let score: usize = category
            .keywords()
            .iter()
            .map(|keyword| haystack.matches(keyword).count())
            .sum();
        if score > best_score {
            best = *category;
            best_score = score;
        }
    }
    tracing::debug!(category = %best, score = best_score, "scored category suggestion");
    best
}

/// Suggestion gate for the editing flow: strips the draft's Markdown down
/// to plain text, and fires only once the author has written enough and
/// has not picked a category themselves
pub fn suggest_for(markdown: &str, selected: Option<Category>) -> Option<SuggestedCategory> {
    if selected.is_some() {
        return None;
    }
    let text = strip_markdown(markdown);
    let length = text.chars().count();
    if length <= SUGGESTION_THRESHOLD {
        return None;
    }
    Some(SuggestedCategory {
        category: suggest_category(&text),
        triggered_at: length,
    })
}

/// Stateful gate for the editing flow: re-scores the draft as the author
/// types, and emits a suggestion only when it differs from the current
/// selection and from the last suggestion already shown
#[derive(Debug, Clone, Default)]
pub struct SuggestionTracker {
    selected: Option<Category>,
    last_emitted: Option<Category>,
}

impl SuggestionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the author's manual category pick
    pub fn select(&mut self, category: Category) {
        self.selected = Some(category);
    }

    pub fn selected(&self) -> Option<Category> {
        self.selected
    }

    /// Re-score the draft content. Fires only past the length threshold,
    /// and never repeats the selected category or the previous suggestion.
    pub fn observe(&mut self, markdown: &str) -> Option<SuggestedCategory> {
        let text = strip_markdown(markdown);
        let length = text.chars().count();
        if length <= SUGGESTION_THRESHOLD {
            return None;
        }
        let category = suggest_category(&text);
        if Some(category) == self.selected || Some(category) == self.last_emitted {
            return None;
        }
        self.last_emitted = Some(category);
        tracing::info!(%category, length, "offering category suggestion");
        Some(SuggestedCategory {
            category,
            triggered_at: length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_defaults_to_daily() {
        assert_eq!(suggest_category("오늘은 그냥 평범한 하루였다"), Category::Daily);
    }

    #[test]
    fn test_korean_exercise_text() {
        assert_eq!(
            suggest_category("오늘 3km 러닝하고 스쿼트 했다"),
            Category::Exercise
        );
    }

    #[test]
    fn test_english_keywords_match_case_insensitively() {
        assert_eq!(
            suggest_category("Fixed a BUG and wrote some Code before deploy"),
            Category::Dev
        );
    }

    #[test]
    fn test_repeated_keyword_occurrences_outvote() {
        // one dev keyword vs three exercise occurrences
        let text = "코딩 조금 하고 운동, 운동, 또 운동";
        assert_eq!(suggest_category(text), Category::Exercise);
    }

    #[test]
    fn test_tie_resolves_in_declaration_order() {
        // one dev keyword and one food keyword; dev is declared first
        assert_eq!(suggest_category("코딩하고 요리했다"), Category::Dev);
    }

    #[test]
    fn test_determinism() {
        let text = "공항에서 비행기 타고 호텔로, 여행 시작";
        let first = suggest_category(text);
        for _ in 0..10 {
            assert_eq!(suggest_category(text), first);
        }
    }

    #[test]
    fn test_short_content_gets_no_suggestion() {
        assert!(suggest_for("러닝 했다", None).is_none());
    }

    #[test]
    fn test_manual_selection_suppresses_suggestion() {
        let long = "오늘 3km 러닝하고 스쿼트 했다. ".repeat(5);
        assert!(suggest_for(&long, Some(Category::Daily)).is_none());
        assert!(suggest_for(&long, None).is_some());
    }

    #[test]
    fn test_suggestion_scores_stripped_text() {
        // keyword lives inside markup; stripping must still expose it
        let markdown = format!("# 오늘의 기록\n\n**러닝** 일지를 남긴다. {}", "내용 ".repeat(20));
        let suggestion = suggest_for(&markdown, None).unwrap();
        assert_eq!(suggestion.category, Category::Exercise);
    }

    #[test]
    fn test_tracker_emits_once_per_suggestion() {
        let mut tracker = SuggestionTracker::new();
        let text = "오늘 3km 러닝하고 스쿼트 했다. ".repeat(5);

        let first = tracker.observe(&text).unwrap();
        assert_eq!(first.category, Category::Exercise);
        // same content again: already shown, stay quiet
        assert!(tracker.observe(&text).is_none());
    }

    #[test]
    fn test_tracker_respects_manual_selection() {
        let mut tracker = SuggestionTracker::new();
        tracker.select(Category::Exercise);
        let text = "오늘 3km 러닝하고 스쿼트 했다. ".repeat(5);
        // suggestion equals the pick: nothing to offer
        assert!(tracker.observe(&text).is_none());
    }

    #[test]
    fn test_tracker_fires_again_when_content_shifts() {
        let mut tracker = SuggestionTracker::new();
        let exercise = "오늘 3km 러닝하고 스쿼트 했다. ".repeat(5);
        assert_eq!(
            tracker.observe(&exercise).unwrap().category,
            Category::Exercise
        );

        let dev = "버그 잡고 코드 리팩토링, 배포까지 했다. ".repeat(5);
        assert_eq!(tracker.observe(&dev).unwrap().category, Category::Dev);
    }

    #[test]
    fn test_suggestion_records_triggering_length() {
        let markdown = format!("# 기록\n\n**러닝** 일지. {}", "내용 ".repeat(20));
        let suggestion = suggest_for(&markdown, None).unwrap();
        assert_eq!(
            suggestion.triggered_at,
            strip_markdown(&markdown).chars().count()
        );
        assert!(suggestion.triggered_at > SUGGESTION_THRESHOLD);

        let mut tracker = SuggestionTracker::new();
        let tracked = tracker.observe(&markdown).unwrap();
        assert_eq!(tracked.triggered_at, suggestion.triggered_at);
    }

    #[test]
    fn test_threshold_boundary() {
        // exactly at the threshold: no suggestion; one over: suggestion
        let at = "러".repeat(SUGGESTION_THRESHOLD);
        assert!(suggest_for(&at, None).is_none());
        let over = "러닝".repeat(SUGGESTION_THRESHOLD);
        assert!(suggest_for(&over, None).is_some());
    }
}
