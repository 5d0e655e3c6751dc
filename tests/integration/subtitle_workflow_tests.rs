/*!
 * End-to-end tests: SRT file in, translated SRT file out, through the mock provider
 */

use anyhow::Result;
use std::fs;

use gemsrt::app_controller::{FileOutcome, Replacement, RunOptions};
use gemsrt::providers::mock::{MockOutcome, MockProvider};
use gemsrt::subtitle_processor::parse_srt;
use gemsrt::translation::{CancellationToken, PipelineStatus};

use crate::common::mock_providers::mock_controller;
use crate::common::{create_temp_dir, create_test_file, create_test_subtitle, init_logging, sample_srt};

#[tokio::test]
async fn test_run_file_shouldWriteTranslatedCopyNextToInput() -> Result<()> {
    init_logging();
    let dir = create_temp_dir()?;
    let input = create_test_subtitle(dir.path(), "movie.srt")?;
    let provider = MockProvider::working();
    let mut controller = mock_controller(provider.clone(), 2);

    let outcome = controller.run_file(&input, &RunOptions::default(), &CancellationToken::new()).await?;

    let output = dir.path().join("translated_movie.srt");
    assert_eq!(outcome, FileOutcome::Written { path: output.clone(), status: PipelineStatus::Completed });
    assert_eq!(provider.request_count(), 2);

    let source = parse_srt(&fs::read_to_string(&input)?);
    let translated = parse_srt(&fs::read_to_string(&output)?);
    assert_eq!(translated.len(), source.len());
    for (s, t) in source.iter().zip(&translated) {
        assert_eq!(t.id, s.id);
        assert_eq!(t.timestamp, s.timestamp);
        assert_eq!(t.text, MockProvider::tag("Indonesian", &s.text));
    }
    Ok(())
}

#[tokio::test]
async fn test_run_file_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_subtitle(dir.path(), "movie.srt")?;
    let existing = create_test_file(dir.path(), "translated_movie.srt", "keep me")?;
    let provider = MockProvider::working();
    let mut controller = mock_controller(provider.clone(), 10);

    let outcome = controller.run_file(&input, &RunOptions::default(), &CancellationToken::new()).await?;
    assert_eq!(outcome, FileOutcome::Skipped { path: existing.clone() });
    assert_eq!(fs::read_to_string(&existing)?, "keep me");
    assert_eq!(provider.request_count(), 0);

    let forced = RunOptions { force_overwrite: true, ..RunOptions::default() };
    let outcome = controller.run_file(&input, &forced, &CancellationToken::new()).await?;
    assert_eq!(outcome.status(), Some(PipelineStatus::Completed));
    assert_ne!(fs::read_to_string(&existing)?, "keep me");
    Ok(())
}

#[tokio::test]
async fn test_run_file_withReplacements_shouldApplyThemBeforeExport() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_subtitle(dir.path(), "movie.srt")?;
    let mut controller = mock_controller(MockProvider::working(), 10);
    let options = RunOptions {
        replacements: vec![
            "2=Berisi beberapa entri.".parse::<Replacement>().unwrap(),
            "9=out of range".parse::<Replacement>().unwrap(),
        ],
        ..RunOptions::default()
    };

    controller.run_file(&input, &options, &CancellationToken::new()).await?;

    let translated = parse_srt(&fs::read_to_string(dir.path().join("translated_movie.srt"))?);
    assert_eq!(translated[1].text, "Berisi beberapa entri.");
    assert_eq!(translated[0].text, "[Indonesian] This is a test subtitle.");
    Ok(())
}

#[tokio::test]
async fn test_run_file_withExplicitOutputFile_shouldWriteThere() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_file(dir.path(), "in.srt", &sample_srt(4))?;
    let target = dir.path().join("exports/final.srt");
    let mut controller = mock_controller(MockProvider::working(), 3);
    let options = RunOptions { output: Some(target.clone()), ..RunOptions::default() };

    controller.run_file(&input, &options, &CancellationToken::new()).await?;

    assert_eq!(parse_srt(&fs::read_to_string(&target)?).len(), 4);
    assert!(!dir.path().join("translated_in.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_file_withStdout_shouldNotWriteFiles() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_subtitle(dir.path(), "movie.srt")?;
    let mut controller = mock_controller(MockProvider::working(), 10);
    let options = RunOptions { to_stdout: true, ..RunOptions::default() };

    let outcome = controller.run_file(&input, &options, &CancellationToken::new()).await?;

    assert_eq!(outcome, FileOutcome::Printed { status: PipelineStatus::Completed });
    assert!(!dir.path().join("translated_movie.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_file_withFailingBatch_shouldNotWriteOutput() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_file(dir.path(), "movie.srt", &sample_srt(4))?;
    let provider = MockProvider::working().with_script([MockOutcome::Translate, MockOutcome::AuthFailure]);
    let mut controller = mock_controller(provider, 2);

    let result = controller.run_file(&input, &RunOptions::default(), &CancellationToken::new()).await;

    assert!(result.is_err());
    assert_eq!(controller.pipeline().status(), PipelineStatus::Failed);
    assert!(!dir.path().join("translated_movie.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_file_withCancelledToken_shouldExportNothing() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_subtitle(dir.path(), "movie.srt")?;
    let mut controller = mock_controller(MockProvider::working(), 10);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = controller.run_file(&input, &RunOptions::default(), &cancel).await?;

    assert_eq!(outcome, FileOutcome::NothingTranslated);
    assert!(!dir.path().join("translated_movie.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_file_withoutEntries_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_test_file(dir.path(), "empty.srt", "\n\n")?;
    let mut controller = mock_controller(MockProvider::working(), 10);

    assert!(controller.run_file(&input, &RunOptions::default(), &CancellationToken::new()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_withFolder_shouldMirrorTreeIntoOutputDir() -> Result<()> {
    let dir = create_temp_dir()?;
    let input_dir = dir.path().join("subs");
    create_test_subtitle(&input_dir, "a.srt")?;
    create_test_subtitle(&input_dir, "season1/b.srt")?;
    let out_dir = dir.path().join("out");
    std::fs::create_dir_all(&out_dir)?;
    let provider = MockProvider::working();
    let mut controller = mock_controller(provider.clone(), 10);

    let options = RunOptions { output: Some(out_dir.clone()), ..RunOptions::default() };
    controller.run(input_dir.clone(), options).await?;

    assert!(out_dir.join("translated_a.srt").exists());
    assert!(out_dir.join("season1/translated_b.srt").exists());
    assert_eq!(provider.request_count(), 2);
    Ok(())
}
