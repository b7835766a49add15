//! End-to-end flows across all three components: sequence resolution,
//! ontology bookkeeping, and annotation aggregation against one store.

use sqlx::PgPool;

use seqannot_core::features::annotations::commands::{add as add_annotation, delete};
use seqannot_core::features::annotations::queries::get_fast;
use seqannot_core::features::annotations::{
    AddAnnotationCommand, DeleteAnnotationCommand, GetFastAnnotationsQuery,
};
use seqannot_core::features::ontology::commands::add_term;
use seqannot_core::features::ontology::AddTermCommand;
use seqannot_core::features::sequences::commands::add as add_sequences;
use seqannot_core::features::sequences::queries::get_id;
use seqannot_core::features::sequences::{AddSequencesCommand, GetSequenceIdQuery};

mod helpers;

use helpers::{read, seed_experiment, seed_primer, term_counters};

fn annotation(experiment_id: i64, sequences: Vec<String>, user_id: Option<i64>) -> AddAnnotationCommand {
    AddAnnotationCommand {
        sequences,
        primer: "v4".to_string(),
        experiment_id,
        annotation_type: "common".to_string(),
        details: vec![("high".to_string(), "feces".to_string())],
        method: None,
        description: None,
        agent_type: None,
        is_private: false,
        user_id,
    }
}

#[sqlx::test]
async fn test_sequence_round_trip(pool: PgPool) -> anyhow::Result<()> {
    seed_primer(&pool, "v4").await?;

    let sequence = read(1, 150);
    let ids = add_sequences::handle(
        pool.clone(),
        AddSequencesCommand {
            sequences: vec![sequence.clone()],
            taxonomies: None,
            external_ids: None,
            primer: "v4".to_string(),
        },
    )
    .await?;

    let resolved = get_id::handle(
        pool.clone(),
        GetSequenceIdQuery {
            sequence: sequence.to_uppercase(),
            primer_id: None,
            require_full_length: false,
            no_longer: false,
        },
    )
    .await?;
    assert_eq!(resolved, ids[0]);
    Ok(())
}

#[sqlx::test]
async fn test_longer_read_matches_stored_prefix(pool: PgPool) -> anyhow::Result<()> {
    seed_primer(&pool, "v4").await?;

    let short = read(7, 100);
    let ids = add_sequences::handle(
        pool.clone(),
        AddSequencesCommand {
            sequences: vec![short.clone()],
            taxonomies: None,
            external_ids: None,
            primer: "v4".to_string(),
        },
    )
    .await?;

    // 200bp read whose first 100 characters equal the stored sequence
    let long = format!("{}{}", short, read(8, 100));
    let resolved = get_id::handle(
        pool.clone(),
        GetSequenceIdQuery {
            sequence: long,
            primer_id: None,
            require_full_length: false,
            no_longer: false,
        },
    )
    .await?;
    assert_eq!(resolved, ids[0]);
    Ok(())
}

#[sqlx::test]
async fn test_annotation_lifecycle_restores_counters(pool: PgPool) -> anyhow::Result<()> {
    seed_primer(&pool, "v4").await?;
    let experiment_id = seed_experiment(&pool, Some(1)).await?;
    add_term::handle(pool.clone(), AddTermCommand::new("feces").with_parent("gut")).await?;

    let reads: Vec<String> = (0..5).map(|i| read(i, 150)).collect();
    let annotation_id =
        add_annotation::handle(pool.clone(), annotation(experiment_id, reads, Some(1))).await?;

    assert_eq!(term_counters(&pool, "feces").await?, (5, 1));
    assert_eq!(term_counters(&pool, "gut").await?, (5, 1));

    delete::handle(
        pool.clone(),
        DeleteAnnotationCommand {
            annotation_id,
            user_id: Some(1),
        },
    )
    .await?;

    assert_eq!(term_counters(&pool, "feces").await?, (0, 0));
    assert_eq!(term_counters(&pool, "gut").await?, (0, 0));
    Ok(())
}

#[sqlx::test]
async fn test_fast_annotations_deduplicates_shared_annotation(pool: PgPool) -> anyhow::Result<()> {
    seed_primer(&pool, "v4").await?;
    let experiment_id = seed_experiment(&pool, Some(1)).await?;

    let reads = vec![read(1, 150), read(2, 150)];
    let annotation_id =
        add_annotation::handle(pool.clone(), annotation(experiment_id, reads.clone(), Some(1)))
            .await?;

    let result = get_fast::handle(pool.clone(), GetFastAnnotationsQuery::new(reads)).await?;
    assert_eq!(result.annotations.len(), 1);
    assert_eq!(
        result.seq_annotations,
        vec![(0, vec![annotation_id]), (1, vec![annotation_id])]
    );
    Ok(())
}

#[sqlx::test]
async fn test_fast_annotations_respects_privacy(pool: PgPool) -> anyhow::Result<()> {
    seed_primer(&pool, "v4").await?;
    let experiment_id = seed_experiment(&pool, Some(1)).await?;

    let reads = vec![read(1, 150)];
    let mut cmd = annotation(experiment_id, reads.clone(), Some(1));
    cmd.is_private = true;
    add_annotation::handle(pool.clone(), cmd).await?;

    let mut query = GetFastAnnotationsQuery::new(reads.clone());
    query.user_id = Some(2);
    let result = get_fast::handle(pool.clone(), query).await?;
    assert!(result.annotations.is_empty());

    let mut query = GetFastAnnotationsQuery::new(reads);
    query.user_id = Some(1);
    let result = get_fast::handle(pool.clone(), query).await?;
    assert_eq!(result.annotations.len(), 1);
    Ok(())
}

#[sqlx::test]
async fn test_term_creation_is_idempotent(pool: PgPool) -> anyhow::Result<()> {
    let first = add_term::handle(pool.clone(), AddTermCommand::new("feces")).await?;
    let second = add_term::handle(pool.clone(), AddTermCommand::new("feces")).await?;
    assert_eq!(first, second);

    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ontology_terms WHERE description = 'feces'")
            .fetch_one(&pool)
            .await?;
    assert_eq!(rows, 1);
    Ok(())
}
