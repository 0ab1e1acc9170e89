use std::path::{Path, PathBuf};
use std::sync::Arc;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;

use crate::analysis::scorer::Scorer;
use crate::error::{Error, Result};
use crate::models::AnalysisResult;

/// Result of analyzing one file in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<AnalysisResult>,
}

/// Drives the scorer over files: reads and decodes résumé text, runs the
/// CPU-bound scoring on the blocking pool, and bounds how many files are
/// in flight at once.
pub struct AnalysisPipeline {
    scorer: Arc<Scorer>,
    concurrency_limit: usize,
}

impl AnalysisPipeline {
    pub fn new(scorer: Scorer, concurrency_limit: usize) -> Self {
        Self {
            scorer: Arc::new(scorer),
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn analyze(&self, resume_text: &str, job_description: Option<&str>) -> AnalysisResult {
        tracing::info!("Analyzing resume ({} bytes)", resume_text.len());
        let result = self.scorer.analyze(resume_text, job_description);
        tracing::info!("Overall score: {}", result.overall_score);
        result
    }

    pub async fn analyze_file(
        &self,
        path: &Path,
        job_description: Option<&str>,
    ) -> Result<AnalysisResult> {
        let job_description: Option<Arc<str>> = job_description.map(Arc::from);
        let result = analyze_one(self.scorer.clone(), path, job_description).await?;
        tracing::info!("{}: overall score {}", path.display(), result.overall_score);
        Ok(result)
    }

    /// Analyzes every file concurrently. Outcomes come back in input order;
    /// a failure on one file does not affect the others.
    pub async fn analyze_files(
        &self,
        paths: &[PathBuf],
        job_description: Option<&str>,
    ) -> Vec<BatchOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let job_description: Option<Arc<str>> = job_description.map(Arc::from);

        let pb = ProgressBar::new(paths.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} resumes")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut futures = Vec::with_capacity(paths.len());

        for path in paths {
            let sem = semaphore.clone();
            let scorer = self.scorer.clone();
            let jd = job_description.clone();
            let path = path.clone();
            let pb_clone = pb.clone();

            futures.push(async move {
                let result = match sem.acquire().await {
                    Ok(_permit) => analyze_one(scorer, &path, jd).await,
                    Err(_) => Err(Error::Validation("analysis pipeline shut down".to_string())),
                };

                if let Err(ref e) = result {
                    tracing::warn!("Failed to analyze {}: {}", path.display(), e);
                }

                pb_clone.inc(1);
                BatchOutcome { path, result }
            });
        }

        let outcomes = join_all(futures).await;
        pb.finish_with_message("Analyzed all resumes");

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(
            "Analyzed {} resumes ({} failed)",
            outcomes.len() - failed,
            failed
        );

        outcomes
    }
}

async fn analyze_one(
    scorer: Arc<Scorer>,
    path: &Path,
    job_description: Option<Arc<str>>,
) -> Result<AnalysisResult> {
    let text = read_text(path).await?;

    tokio::task::spawn_blocking(move || scorer.analyze(&text, job_description.as_deref()))
        .await
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

/// Reads a file as UTF-8 text. Undecodable content is an `InvalidData` I/O error.
pub async fn read_text(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes).map_err(|e| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is not valid UTF-8: {}", path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pipeline() -> AnalysisPipeline {
        AnalysisPipeline::new(Scorer::with_builtin_catalog().unwrap(), 2)
    }

    #[tokio::test]
    async fn test_analyze_files_preserves_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.txt");
        std::fs::File::create(&good)
            .unwrap()
            .write_all(b"Skills\npython, sql, docker\nme@example.com")
            .unwrap();

        let binary = dir.path().join("binary.pdf");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x81]).unwrap();

        let missing = dir.path().join("missing.txt");

        let paths = vec![good.clone(), binary.clone(), missing.clone()];
        let outcomes = pipeline().analyze_files(&paths, None).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].path, good);
        let result = outcomes[0].result.as_ref().unwrap();
        assert_eq!(result.skills.technical, vec!["python", "sql", "docker"]);

        match &outcomes[1].result {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("expected decode failure, got {:?}", other),
        }
        assert!(matches!(outcomes[2].result, Err(Error::Io(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_analyze_file_reports_undecodable_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.doc");
        std::fs::write(&path, [0xc3, 0x28, 0xa0]).unwrap();

        match pipeline().analyze_file(&path, None).await {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("expected decode failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_and_batch_analysis_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Skills\n• python\n• teamwork\nme@example.com").unwrap();

        let pipeline = pipeline();
        let single = pipeline.analyze_file(&path, Some("python, sql")).await.unwrap();
        let batch = pipeline
            .analyze_files(&[path.clone()], Some("python, sql"))
            .await
            .remove(0)
            .result
            .unwrap();
        assert_eq!(single, batch);
    }

    #[tokio::test]
    async fn test_analyze_file_matches_direct_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        let text = "Experience\nLed a team of 5 developers.\nEducation\nBachelor of Science.";
        std::fs::write(&path, text).unwrap();

        let pipeline = pipeline();
        let from_file = pipeline.analyze_file(&path, Some("python")).await.unwrap();
        assert_eq!(from_file, pipeline.analyze(text, Some("python")));
    }
}
