//! End-to-end tests for the extraction controller.
//!
//! These drive `extract_and_process` with scripted pages and verdicts:
//! 1. Direct hits
//! 2. One follow-up hop
//! 3. Refused hops (confidence, depth)
//! 4. Fetch and judge failures

use proptest::prelude::*;
use recipe_extraction::{
    classify, decide_follow_up,
    testing::{follow_up_verdict, sample_recipe, valid_verdict, MockContentSource, MockJudge},
    ExtractionStatus, FollowUpDecision, GenerationRequest, JudgeError, JudgmentResponse,
    PipelineConfig, RecipeExtractor, TestScenario,
};

const BLOG: &str = "https://example.com/recipes/lasagna";
const POST: &str = "https://www.instagram.com/p/Cx1y2z3/";

fn partial_verdict() -> JudgmentResponse {
    let mut partial = sample_recipe("Lasagna");
    partial.instructions.clear();

    JudgmentResponse {
        recipe_name: Some("Lasagna".into()),
        has_ingredients: true,
        partial_recipe_data: Some(partial),
        reason: "Ingredients listed but no method".into(),
        confidence: 0.7,
        ..JudgmentResponse::degraded("")
    }
}

#[tokio::test]
async fn test_blog_recipe_found_at_depth_zero() {
    let (source, judge) = TestScenario::new()
        .with_page(BLOG, "Lasagna\n12 noodles\n2 cups ricotta...", valid_verdict(sample_recipe("Lasagna")))
        .build();

    let result = RecipeExtractor::new(source, judge)
        .extract_and_process(BLOG)
        .await;

    assert!(result.success);
    assert_eq!(result.status, ExtractionStatus::Recipe);
    assert_eq!(result.extraction_depth, 0);
    assert_eq!(result.extraction_url, BLOG);
    assert_eq!(result.recipe_name.as_deref(), Some("Lasagna"));
    assert!(result.error.is_none());

    let record = result.recipe_json.unwrap();
    assert_eq!(record.source_url.as_deref(), Some(BLOG));
    assert_eq!(record.recipe.ingredients.len(), 3);
}

#[tokio::test]
async fn test_caption_link_is_followed_once() {
    let (source, judge) = TestScenario::new()
        .with_page(POST, "Full recipe on the blog! link in bio", follow_up_verdict(BLOG, 0.85))
        .with_page(BLOG, "Lasagna\n12 noodles...", valid_verdict(sample_recipe("Lasagna")))
        .build();

    let extractor = RecipeExtractor::new(source, judge);
    let result = extractor.extract_and_process(POST).await;

    assert!(result.success);
    assert_eq!(result.extraction_depth, 1);
    assert_eq!(result.extraction_url, BLOG);
    // The record points at the page the recipe came from, not the post
    let record = result.recipe_json.as_ref().unwrap();
    assert_eq!(record.source_url.as_deref(), Some(BLOG));
    assert_eq!(extractor.source().calls(), vec![POST.to_string(), BLOG.to_string()]);

    let depths: Vec<u8> = extractor.judge().requests().iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1]);
}

#[tokio::test]
async fn test_low_confidence_link_is_not_followed() {
    let (source, judge) = TestScenario::new()
        .with_page(POST, "Maybe check my blog", follow_up_verdict(BLOG, 0.4))
        .build();

    let extractor = RecipeExtractor::new(source, judge);
    let result = extractor.extract_and_process(POST).await;

    assert!(!result.success);
    assert_eq!(result.status, ExtractionStatus::NoRecipe);
    assert_eq!(
        result.error.as_deref(),
        Some("No valid recipe found and follow-up URL confidence too low (0.40 < 0.6)")
    );
    assert_eq!(result.follow_up_url.as_deref(), Some(BLOG));
    assert_eq!(extractor.source().calls().len(), 1);
}

#[tokio::test]
async fn test_second_hop_is_refused() {
    let (source, judge) = TestScenario::new()
        .with_page(POST, "see blog", follow_up_verdict(BLOG, 0.9))
        .with_page(BLOG, "see other blog", follow_up_verdict("https://other.example.com/r", 0.95))
        .build();

    let extractor = RecipeExtractor::new(source, judge);
    let result = extractor.extract_and_process(POST).await;

    assert!(!result.success);
    assert_eq!(result.extraction_depth, 1);
    assert_eq!(
        result.error.as_deref(),
        Some("No valid recipe found and depth limit reached (max: 1)")
    );
    assert_eq!(extractor.source().calls().len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_is_reported() {
    let (source, judge) = TestScenario::new()
        .with_unreachable(BLOG, "Request timed out while fetching https://example.com/recipes/lasagna")
        .build();

    let extractor = RecipeExtractor::new(source, judge);
    let result = extractor.extract_and_process(BLOG).await;

    assert_eq!(result.status, ExtractionStatus::FetchFailed);
    assert!(result.is_fetch_failure());
    assert_eq!(result.reason, "Content extraction failed");
    assert!(result.error.unwrap().starts_with("Request timed out"));
    assert!(extractor.judge().requests().is_empty());
}

#[tokio::test]
async fn test_follow_up_fetch_failure_keeps_depth() {
    let (source, judge) = TestScenario::new()
        .with_page(POST, "see blog", follow_up_verdict(BLOG, 0.9))
        .build();

    let result = RecipeExtractor::new(source, judge)
        .extract_and_process(POST)
        .await;

    assert_eq!(result.status, ExtractionStatus::FetchFailed);
    assert_eq!(result.extraction_depth, 1);
    assert_eq!(result.extraction_url, BLOG);
}

#[tokio::test]
async fn test_judge_failure_degrades() {
    let source = MockContentSource::new().with_page(BLOG, "some text", "Web Page");
    let judge = MockJudge::new().with_error_for(BLOG, || JudgeError::Api {
        status: 429,
        message: "rate limited".into(),
    });

    let result = RecipeExtractor::new(source, judge)
        .extract_and_process(BLOG)
        .await;

    assert!(!result.success);
    assert_eq!(result.status, ExtractionStatus::NoRecipe);
    assert_eq!(result.confidence, 0.0);
    assert!(result.reason.starts_with("Validation/formatting failed:"));
    assert_eq!(result.error.as_deref(), Some("No valid recipe found"));
}

#[tokio::test]
async fn test_partial_evidence_is_attached_untruncated() {
    let content = "Lasagna\n12 noodles\n2 cups ricotta\nsalt to taste";
    let (source, judge) = TestScenario::new()
        .with_page(BLOG, content, partial_verdict())
        .build();

    let extractor = RecipeExtractor::new(source, judge)
        .with_config(PipelineConfig::new().with_max_content_chars(10));
    let result = extractor.extract_and_process(BLOG).await;

    assert!(!result.success);
    assert_eq!(result.extracted_content.as_deref(), Some(content));
    assert!(result.partial_recipe_data.is_some());

    // The judge only saw the truncated text
    assert_eq!(extractor.judge().requests()[0].content.chars().count(), 10);

    let request = GenerationRequest::from_failed(&result).unwrap();
    assert_eq!(request.recipe_name, "Lasagna");
    assert!(request.has_partial_evidence());
}

#[tokio::test]
async fn test_no_evidence_leaves_content_out() {
    let (source, judge) = TestScenario::new()
        .with_page(BLOG, "About us", JudgmentResponse::degraded("Not a recipe"))
        .build();

    let result = RecipeExtractor::new(source, judge)
        .extract_and_process(BLOG)
        .await;

    assert!(result.extracted_content.is_none());
    assert!(result.partial_recipe_data.is_none());
}

#[tokio::test]
async fn test_valid_without_recipe_data_is_not_success() {
    let verdict = JudgmentResponse {
        is_valid_recipe: true,
        confidence: 0.9,
        ..JudgmentResponse::degraded("Looks complete")
    };
    let (source, judge) = TestScenario::new().with_page(BLOG, "text", verdict).build();

    let result = RecipeExtractor::new(source, judge)
        .extract_and_process(BLOG)
        .await;

    assert!(!result.success);
    assert!(result.recipe_json.is_none());
}

proptest! {
    #[test]
    fn property_follow_up_rule(
        has_url in any::<bool>(),
        confidence in 0.0f32..=1.0,
        depth in 0u8..3,
        threshold in 0.0f32..=1.0,
    ) {
        let verdict = if has_url {
            follow_up_verdict(BLOG, confidence)
        } else {
            JudgmentResponse::degraded("")
        };

        let decision = decide_follow_up(&verdict, depth, threshold);
        let should_follow = has_url && depth < 1 && confidence >= threshold;

        prop_assert_eq!(matches!(decision, FollowUpDecision::Follow(_)), should_follow);
        if has_url && depth >= 1 {
            prop_assert_eq!(decision, FollowUpDecision::DepthExhausted);
        }
    }

    #[test]
    fn property_depth_never_exceeds_one(chain_len in 1usize..6, confidence in 0.0f32..=1.0) {
        let urls: Vec<String> = (0..chain_len)
            .map(|i| format!("https://example.com/page/{}", i))
            .collect();

        let mut scenario = TestScenario::new();
        for (i, url) in urls.iter().enumerate() {
            let next = format!("https://example.com/page/{}", i + 1);
            scenario = scenario.with_page(url, "teaser", follow_up_verdict(&next, confidence));
        }
        let (source, judge) = scenario.build();
        let extractor = RecipeExtractor::new(source, judge);

        let result = tokio_test::block_on(extractor.extract_and_process(&urls[0]));

        prop_assert!(result.extraction_depth <= 1);
        prop_assert!(extractor.source().calls().len() <= 2);
        prop_assert!(!result.success);
    }

    #[test]
    fn property_classification_is_stable(path in "[a-z0-9/]{0,20}") {
        for host in ["www.instagram.com", "youtu.be", "m.tiktok.com", "example.com"] {
            let url = format!("https://{}/{}", host, path);
            prop_assert_eq!(classify(&url), classify(&url));
            prop_assert_eq!(classify(&url), classify(&url.to_uppercase().replace("HTTPS", "https")));
        }
    }
}
