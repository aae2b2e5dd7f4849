//! Debate languages and the built-in topic pools.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Language both agents argue in. Fixed for the duration of a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    /// Korean.
    Ko,
    /// English.
    En,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ko => write!(f, "KO"),
            Self::En => write!(f, "EN"),
        }
    }
}

const TOPICS_KO: [&str; 10] = [
    "AI는 인류에게 위험한가?",
    "하와이안 피자는 범죄인가?",
    "고양이가 개보다 더 나은 반려동물이다.",
    "비디오 게임은 폭력을 유발하는가?",
    "보편적 기본소득은 필요한가?",
    "학교 내 스마트폰 사용을 금지해야 한다.",
    "마블 영화가 DC보다 낫다.",
    "인류는 화성을 식민지화해야 한다.",
    "재택근무가 사무실 근무보다 낫다.",
    "SNS는 득보다 실이 많다.",
];

const TOPICS_EN: [&str; 10] = [
    "Is AI dangerous for humanity?",
    "Pineapple on pizza is a crime.",
    "Cats are better pets than dogs.",
    "Video games cause violence.",
    "Universal Basic Income is necessary.",
    "Mobile phones should be banned in schools.",
    "Marvel movies are better than DC.",
    "Humanity should colonize Mars.",
    "Remote work is better than office work.",
    "Social media does more harm than good.",
];

/// The built-in topic pool for a language.
pub fn topic_pool(language: Language) -> &'static [&'static str] {
    match language {
        Language::Ko => &TOPICS_KO,
        Language::En => &TOPICS_EN,
    }
}

/// Suggest a random topic from the pool for `language`.
pub fn random_topic(language: Language) -> &'static str {
    topic_pool(language)
        .choose(&mut rand::thread_rng())
        .copied()
        .expect("topic pool is never empty")
}
