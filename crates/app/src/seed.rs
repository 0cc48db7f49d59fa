use anyhow::Context;
use serde::Serialize;
use services::AppServices;
use storage::repository::{
    LevelRepository, ListQuery, ListScope, Storage, VocabListRepository, WordRepository,
};
use vocab_core::model::{LanguageLevel, LevelId, UserId, VocabListId, VocabularyList, Word, WordId};

const LEVELS: [(&str, &str); 6] = [
    ("A1", "Beginner"),
    ("A2", "Elementary"),
    ("B1", "Intermediate"),
    ("B2", "Upper intermediate"),
    ("C1", "Advanced"),
    ("C2", "Proficient"),
];

/// Sample system lists: (level, name, words).
const SAMPLE_LISTS: [(&str, &str, &[(&str, &str)]); 4] = [
    (
        "A1",
        "Grundwortschatz",
        &[
            ("Haus", "house"),
            ("Hund", "dog"),
            ("Katze", "cat"),
            ("Wasser", "water"),
            ("Brot", "bread"),
            ("gehen", "to go"),
        ],
    ),
    (
        "A2",
        "Unterwegs",
        &[
            ("Bahnhof", "train station"),
            ("Fahrkarte", "ticket"),
            ("Wohnung", "apartment"),
            ("einkaufen", "to shop"),
        ],
    ),
    (
        "B1",
        "Alltag und Beruf",
        &[
            ("Erfahrung", "experience"),
            ("Umwelt", "environment"),
            ("Verantwortung", "responsibility"),
            ("sich bewerben", "to apply"),
        ],
    ),
    (
        "B2",
        "Gesellschaft",
        &[
            ("Nachhaltigkeit", "sustainability"),
            ("Voraussetzung", "prerequisite"),
        ],
    ),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub levels_created: u32,
    pub lists_created: u32,
    pub words_created: u32,
    pub learner_created: bool,
}

/// Populate levels, one learner and a few German system lists. Safe to rerun.
pub async fn seed(app: &AppServices, user: UserId, username: &str) -> anyhow::Result<SeedReport> {
    let storage = app.storage();
    let mut report = SeedReport {
        levels_created: seed_levels(storage).await?,
        ..SeedReport::default()
    };

    for (code, name, words) in SAMPLE_LISTS {
        let (list, created) = system_list(storage, code, name).await?;
        report.lists_created += u32::from(created);

        let existing = storage.words.list_words(list).await?;
        for (text, translation) in words {
            if existing.iter().any(|w| w.text() == *text) {
                continue;
            }
            let word = Word::new(WordId::new(0), list, *text, *translation)
                .with_context(|| format!("sample word {text}"))?;
            storage.words.insert_new_word(&word).await?;
            report.words_created += 1;
        }
    }

    report.learner_created = app.ensure_learner(user, username).await?;
    tracing::info!(
        levels = report.levels_created,
        lists = report.lists_created,
        words = report.words_created,
        "seed finished"
    );
    Ok(report)
}

async fn seed_levels(storage: &Storage) -> anyhow::Result<u32> {
    let mut next_id = storage
        .levels
        .list_levels()
        .await?
        .iter()
        .map(|l| l.id().value())
        .max()
        .unwrap_or(0);
    let mut created = 0;
    for (code, description) in LEVELS {
        if storage.levels.find_level_by_code(code).await?.is_some() {
            continue;
        }
        next_id += 1;
        let level = LanguageLevel::new(LevelId::new(next_id), code, description)
            .with_context(|| format!("level {code}"))?;
        storage.levels.upsert_level(&level).await?;
        created += 1;
    }
    Ok(created)
}

async fn system_list(
    storage: &Storage,
    level_code: &str,
    name: &str,
) -> anyhow::Result<(VocabListId, bool)> {
    let query =
        ListQuery::scoped(ListScope::System).with_level_code(Some(level_code.to_owned()));
    if let Some(list) = storage
        .lists
        .list_lists(&query)
        .await?
        .into_iter()
        .find(|l| l.name() == name)
    {
        return Ok((list.id(), false));
    }

    let level = storage
        .levels
        .find_level_by_code(level_code)
        .await?
        .with_context(|| format!("level {level_code} missing"))?;
    let draft = VocabularyList::system(VocabListId::new(0), name, level.id())?;
    Ok((storage.lists.insert_new_list(&draft).await?, true))
}
