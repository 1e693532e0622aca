mod geotiff;

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use pcd_core::raster::ElevationRaster;

pub use geotiff::read_geotiff;

use crate::{
    error::GriddingError,
    exchange::{ScatterExchange, LAYER_NAME},
    request::{GridRequest, Gridder},
};

/// Runs the external `gdal_grid` tool on a VRT-described scatter CSV.
///
/// Each call owns a [`ScatterExchange`]; it is removed when the call
/// returns, on success and on failure. The tool is killed once `timeout`
/// elapses. Non-zero exits, timeouts and missing output are retried up to
/// `retries` times; failure to start the tool is not.
#[derive(Debug, Clone)]
pub struct GdalGridCommand {
    pub program: PathBuf,
    pub timeout: Duration,
    pub retries: u32,
    pub work_root: Option<PathBuf>,
    pub poll_interval: Duration,
}

impl Default for GdalGridCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gdal_grid"),
            timeout: Duration::from_secs(600),
            retries: 1,
            work_root: None,
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl GdalGridCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    fn run_once(
        &self,
        exchange: &ScatterExchange,
        request: &GridRequest<'_>,
    ) -> Result<ElevationRaster, GriddingError> {
        let output = exchange.output_path();
        if output.exists() {
            fs::remove_file(&output)?;
        }
        let log_path = exchange.log_path();
        let stderr = File::create(&log_path)?;

        let mut child = Command::new(&self.program)
            .arg("-q")
            .args(["-a", &request.algorithm.gdal_arg()])
            .args([
                "-outsize",
                &request.size.width.to_string(),
                &request.size.height.to_string(),
            ])
            .args(["-of", "GTiff", "-ot", "Float64", "-l", LAYER_NAME])
            .arg(exchange.vrt_path())
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|source| GriddingError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let waited = wait_with_timeout(&mut child, self.timeout, self.poll_interval).map_err(
            |source| GriddingError::Wait {
                program: self.program.clone(),
                source,
            },
        )?;
        let status = match waited {
            Some(status) => status,
            None => {
                return Err(GriddingError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                })
            }
        };

        if !status.success() {
            return Err(GriddingError::ExitStatus {
                program: self.program.clone(),
                status: status.to_string(),
                stderr: read_log_tail(&log_path),
            });
        }
        if !output.exists() {
            return Err(GriddingError::NoOutput(output));
        }

        read_geotiff(&output)
    }
}

impl Gridder for GdalGridCommand {
    fn grid(&self, request: &GridRequest<'_>) -> Result<ElevationRaster, GriddingError> {
        if request.points.is_empty() {
            return Err(GriddingError::EmptyScatter);
        }
        request.size.check()?;

        let exchange = ScatterExchange::create(request.points, self.work_root.as_deref())?;
        let mut attempt = 0;
        loop {
            match self.run_once(&exchange, request) {
                Ok(raster) => return Ok(raster),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    log::warn!("gdal_grid attempt {attempt} failed, retrying: {err}");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &'static str {
        "gdal_grid"
    }
}

/// `Ok(None)` when the child had to be killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    poll_interval: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            // the child may exit between try_wait and kill
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(poll_interval);
    }
}

fn read_log_tail(path: &Path) -> String {
    let text = fs::read_to_string(path).unwrap_or_default();
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join(" | ")
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use pcd_core::pointcloud::point::SurveyPoint;

    use super::*;
    use crate::request::{GridAlgorithm, GridSize};

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn points() -> Vec<SurveyPoint> {
        vec![
            SurveyPoint::new(0.0, 0.0, 1.0),
            SurveyPoint::new(1.0, 1.0, 2.0),
        ]
    }

    fn request(points: &[SurveyPoint]) -> GridRequest<'_> {
        GridRequest {
            points,
            algorithm: GridAlgorithm::default(),
            size: GridSize::new(4, 4),
        }
    }

    fn command(program: PathBuf, work_root: &Path) -> GdalGridCommand {
        GdalGridCommand {
            program,
            timeout: Duration::from_secs(10),
            retries: 1,
            work_root: Some(work_root.to_path_buf()),
            poll_interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn failing_tool_is_retried_once_and_cleans_up() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let counter = bin.path().join("count");
        let tool = script(
            bin.path(),
            "gdal_grid",
            &format!("echo run >> {}\necho 'ERROR 1: boom' >&2\nexit 3", counter.display()),
        );

        let pts = points();
        let err = command(tool, work.path()).grid(&request(&pts)).unwrap_err();
        match &err {
            GriddingError::ExitStatus { stderr, .. } => assert!(stderr.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 2);
        assert_eq!(fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn hung_tool_times_out() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let tool = script(bin.path(), "gdal_grid", "exec sleep 30");

        let mut cmd = command(tool, work.path());
        cmd.timeout = Duration::from_millis(200);
        cmd.retries = 0;

        let pts = points();
        let started = Instant::now();
        let err = cmd.grid(&request(&pts)).unwrap_err();
        assert!(matches!(err, GriddingError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_tool_is_not_retried() {
        let work = tempfile::tempdir().unwrap();
        let pts = points();
        let err = command(PathBuf::from("/nonexistent/gdal_grid"), work.path())
            .grid(&request(&pts))
            .unwrap_err();
        assert!(matches!(err, GriddingError::Spawn { .. }));
        assert!(!err.is_transient());
        assert_eq!(fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn tool_without_output_is_reported() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let tool = script(bin.path(), "gdal_grid", "exit 0");
        let pts = points();
        let err = command(tool, work.path()).grid(&request(&pts)).unwrap_err();
        assert!(matches!(err, GriddingError::NoOutput(_)));
    }

    #[test]
    fn output_raster_is_read_back() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let fixture = bin.path().join("fixture.tif");
        geotiff::tests::write_fixture(&fixture, 3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        // copy the fixture to the last argument, after checking the VRT is in place
        let tool = script(
            bin.path(),
            "gdal_grid",
            &format!(
                "for last; do :; done\nprev=\"\"\nfor a; do [ \"$a\" = \"$last\" ] || prev=\"$a\"; done\n\
                 grep -q OGRVRTDataSource \"$prev\" || exit 9\ncp {} \"$last\"",
                fixture.display()
            ),
        );

        let pts = points();
        let raster = command(tool, work.path()).grid(&request(&pts)).unwrap();
        assert_eq!(raster.nrow(), 2);
        assert_eq!(raster.ncol(), 3);
        assert_eq!(raster[(1, 2)], 6.0);
        assert_eq!(fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_scatter_is_rejected_before_running() {
        let work = tempfile::tempdir().unwrap();
        let err = command(PathBuf::from("/nonexistent/gdal_grid"), work.path())
            .grid(&request(&[]))
            .unwrap_err();
        assert!(matches!(err, GriddingError::EmptyScatter));
    }
}
