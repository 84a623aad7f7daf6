//! Fixed catalog of narrow topics grouped under broader ones.
//!
//! The group is the fallback query when a narrow topic has no feeds of its
//! own (see [`crate::scout::Scout::scout_and_vet`]).

pub const GROUPED_TOPICS: &[(&str, &[&str])] = &[
    (
        "Sports",
        &[
            "Football",
            "Cricket",
            "Tennis",
            "Basketball",
            "Baseball",
            "Formula 1",
            "Olympics",
            "Golf",
            "Hockey",
        ],
    ),
    (
        "Health",
        &[
            "Diabetes",
            "Cancer",
            "Mental Health",
            "Heart Disease",
            "COVID-19",
            "Nutrition",
            "Fitness",
            "Obesity",
            "Alzheimer's",
            "Malaria",
            "HIV/AIDS",
            "Tuberculosis",
            "Dengue",
            "Zika",
            "Ebola",
            "Polio",
            "Measles",
            "Influenza",
            "Asthma",
            "Arthritis",
            "Epilepsy",
            "Autism",
            "Parkinson's",
            "Multiple Sclerosis",
            "Lupus",
            "Cystic Fibrosis",
            "Rare Diseases",
        ],
    ),
    (
        "Technology",
        &[
            "Artificial Intelligence",
            "Cybersecurity",
            "Gadgets",
            "Software Development",
            "Space",
            "Blockchain",
            "Startups",
        ],
    ),
    (
        "Science",
        &[
            "Astronomy",
            "Physics",
            "Biology",
            "Climate Change",
            "Genetics",
            "Chemistry",
        ],
    ),
    (
        "World",
        &["Asia", "Europe", "Americas", "Africa", "Middle East", "Oceania"],
    ),
    (
        "Business",
        &[
            "Stock Market",
            "Startups",
            "Economy",
            "Personal Finance",
            "Real Estate",
            "Cryptocurrency",
        ],
    ),
    (
        "Education",
        &["EdTech", "Higher Education", "K-12", "Online Learning"],
    ),
    (
        "Politics",
        &[
            "Elections",
            "Policy",
            "International Relations",
            "Government",
        ],
    ),
    (
        "Entertainment",
        &["Movies", "Music", "Television", "Celebrities", "Gaming"],
    ),
    (
        "Climate",
        &[
            "Global Warming",
            "Renewable Energy",
            "Wildlife",
            "Pollution",
        ],
    ),
];

/// Every narrow topic, in catalog order. A topic listed under two groups
/// appears once.
pub fn all_topics() -> Vec<&'static str> {
    let mut topics: Vec<&'static str> = Vec::new();
    for topic in GROUPED_TOPICS.iter().flat_map(|(_, subs)| subs.iter()) {
        if !topics.contains(topic) {
            topics.push(topic);
        }
    }
    topics
}

/// The group a topic falls back to. When a topic sits in several groups the
/// last one listed wins.
pub fn group_for(topic: &str) -> Option<&'static str> {
    GROUPED_TOPICS
        .iter()
        .rev()
        .find(|(_, subs)| subs.contains(&topic))
        .map(|(group, _)| *group)
}

pub fn is_known(topic: &str) -> bool {
    group_for(topic).is_some()
}
