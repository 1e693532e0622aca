use std::{
    ffi::{CStr, CString},
    os::raw::c_char,
    path::{Path, PathBuf},
    ptr,
};

use pcd_core::pointcloud::point::SurveyPoint;
use proj_sys as proj;

#[derive(Debug)]
pub struct ProjError {
    pub code: i32,
    pub message: String,
    pub context: &'static str,
}

impl std::fmt::Display for ProjError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PROJ error ({}): {} {}",
            self.context, self.code, self.message
        )
    }
}

impl std::error::Error for ProjError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source CRS to target CRS.
    Forward,
    /// Target CRS back to source CRS.
    Inverse,
}

impl Direction {
    fn as_pj(self) -> proj::PJ_DIRECTION {
        match self {
            Self::Forward => proj::PJ_DIRECTION_PJ_FWD,
            Self::Inverse => proj::PJ_DIRECTION_PJ_INV,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjOptions {
    /// Extra search path for `proj.db` and grid files.
    pub data_dir: Option<PathBuf>,
    /// Allow PROJ to fetch missing grid files from the CDN.
    pub network: bool,
}

/// A PROJ CRS-to-CRS operation with longitude/easting-first axis order on both ends.
#[derive(Debug)]
pub struct ProjTransformer {
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
}

impl ProjTransformer {
    /// `source` and `target` accept anything `proj_create_crs_to_crs` does:
    /// WKT, PROJ strings or `AUTHORITY:CODE`.
    pub fn new(source: &str, target: &str, options: &ProjOptions) -> Result<Self, ProjError> {
        // Context is recommended for multi-threaded use; a context must be used by
        // only one thread at a time.
        let ctx = unsafe { proj::proj_context_create() };
        if ctx.is_null() {
            return Err(ProjError {
                code: 0,
                message: "proj_context_create() returned NULL".to_string(),
                context: "proj_context_create",
            });
        }

        if options.network {
            unsafe {
                proj::proj_context_set_enable_network(ctx, 1);
                proj::proj_grid_cache_set_enable(ctx, 1);
            }
        }

        if let Some(dir) = options.data_dir.as_deref() {
            if let Err(err) = set_search_path(ctx, dir) {
                unsafe {
                    proj::proj_context_destroy(ctx);
                }
                return Err(err);
            }
        }

        let (source, target) = match (CString::new(source), CString::new(target)) {
            (Ok(s), Ok(t)) => (s, t),
            _ => {
                unsafe {
                    proj::proj_context_destroy(ctx);
                }
                return Err(ProjError {
                    code: 0,
                    message: "CRS definition contains NUL byte".to_string(),
                    context: "proj_create_crs_to_crs",
                });
            }
        };

        let pj = unsafe {
            proj::proj_create_crs_to_crs(ctx, source.as_ptr(), target.as_ptr(), ptr::null_mut())
        };
        if pj.is_null() {
            let err = proj_error_from_ctx(ctx, "proj_create_crs_to_crs");
            unsafe {
                proj::proj_context_destroy(ctx);
            }
            return Err(err);
        }

        // Normalize axis order (e.g. EPSG:4326 is lat,lon by definition).
        let normalized = unsafe { proj::proj_normalize_for_visualization(ctx, pj) };
        unsafe {
            proj::proj_destroy(pj);
        }
        if normalized.is_null() {
            let err = proj_error_from_ctx(ctx, "proj_normalize_for_visualization");
            unsafe {
                proj::proj_context_destroy(ctx);
            }
            return Err(err);
        }

        Ok(Self {
            ctx,
            pj: normalized,
        })
    }

    /// Transforms `x`/`y` of every point in place; `z` is left untouched.
    ///
    /// Fails if PROJ reports an error or any output coordinate is not finite,
    /// so a successful call never leaves a point unprojected.
    pub fn transform_xy_in_place(
        &mut self,
        points: &mut [SurveyPoint],
        direction: Direction,
    ) -> Result<(), ProjError> {
        if points.is_empty() {
            return Ok(());
        }

        let stride = std::mem::size_of::<SurveyPoint>();
        let n = points.len();

        unsafe {
            proj::proj_errno_reset(self.pj);

            let first = points.as_mut_ptr();
            let x = ptr::addr_of_mut!((*first).x);
            let y = ptr::addr_of_mut!((*first).y);

            proj::proj_trans_generic(
                self.pj,
                direction.as_pj(),
                x,
                stride,
                n,
                y,
                stride,
                n,
                ptr::null_mut(),
                0,
                0,
                ptr::null_mut(),
                0,
                0,
            );

            let err = proj::proj_errno(self.pj);
            if err != 0 {
                return Err(proj_error_from_pj(self.ctx, self.pj, "proj_trans_generic"));
            }
        }

        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(ProjError {
                code: 0,
                message: format!("point {index} has no valid projection"),
                context: "proj_trans_generic",
            });
        }

        Ok(())
    }
}

impl Drop for ProjTransformer {
    fn drop(&mut self) {
        unsafe {
            if !self.pj.is_null() {
                proj::proj_destroy(self.pj);
                self.pj = ptr::null_mut();
            }
            if !self.ctx.is_null() {
                proj::proj_context_destroy(self.ctx);
                self.ctx = ptr::null_mut();
            }
        }
    }
}

fn set_search_path(ctx: *mut proj::PJ_CONTEXT, dir: &Path) -> Result<(), ProjError> {
    let c_path = CString::new(dir.to_string_lossy().as_bytes()).map_err(|_| ProjError {
        code: 0,
        message: "proj data dir contains NUL byte".to_string(),
        context: "proj_context_set_search_paths",
    })?;
    let paths = [c_path.as_ptr()];
    unsafe {
        proj::proj_context_set_search_paths(ctx, paths.len() as i32, paths.as_ptr());
    }
    Ok(())
}

fn proj_error_from_ctx(ctx: *mut proj::PJ_CONTEXT, context: &'static str) -> ProjError {
    let code = unsafe { proj::proj_context_errno(ctx) } as i32;
    let message = proj_error_message(ctx, code);
    ProjError {
        code,
        message,
        context,
    }
}

fn proj_error_from_pj(
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
    context: &'static str,
) -> ProjError {
    let code = unsafe { proj::proj_errno(pj) } as i32;
    let message = proj_error_message(ctx, code);
    ProjError {
        code,
        message,
        context,
    }
}

fn proj_error_message(ctx: *mut proj::PJ_CONTEXT, code: i32) -> String {
    let c_msg = unsafe { proj::proj_context_errno_string(ctx, code) };
    if c_msg.is_null() {
        return "unknown error".to_string();
    }
    unsafe { CStr::from_ptr(c_msg as *const c_char) }
        .to_string_lossy()
        .into_owned()
}
