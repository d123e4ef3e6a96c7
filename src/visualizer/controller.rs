use crate::assets::fonts::FontLibrary;
use crate::assets::loader::{DefaultImageLoader, ImageLoader};
use crate::foundation::core::{MAX_SURFACE_DIM, RenderingContext, Viewport, surface_dim};
use crate::foundation::error::{PagevisError, PagevisResult};
use crate::page::model::Page;
use crate::page::styles::{
    ExportFormat, ExportOptions, GlobalStyles, PartialGlobalStyles, RenderingMode,
    VisualizerConfig,
};
use crate::render::animation::{DetachedScene, SceneGraphSink};
use crate::render::backend::{RendererDeps, SurfaceRenderer, SurfaceSnapshot, create_renderer};
use crate::schema::validate::{
    validate_config, validate_export_options, validate_global_styles, validate_page,
    validate_partial_styles,
};
use crate::visualizer::mount::{HeadlessMount, MountTarget, SurfaceDescriptor};

type LoadHook = Box<dyn FnOnce()>;
type RenderHook = Box<dyn FnMut(&Page)>;
type ErrorHook = Box<dyn FnMut(&PagevisError)>;

#[derive(Default)]
struct Hooks {
    on_render: Option<RenderHook>,
    on_error: Option<ErrorHook>,
}

impl Hooks {
    fn rendered(&mut self, page: &Page) {
        if let Some(hook) = self.on_render.as_mut() {
            hook(page);
        }
    }

    fn failed(&mut self, err: &PagevisError) {
        if let Some(hook) = self.on_error.as_mut() {
            hook(err);
        }
    }
}

// Collaborators that exist only while the visualizer is active.
struct Live {
    renderer: Box<dyn SurfaceRenderer>,
    mount: Box<dyn MountTarget>,
    scene: Box<dyn SceneGraphSink>,
}

/// Builder for [`PageVisualizer`].
pub struct PageVisualizerBuilder {
    config: VisualizerConfig,
    mount: Option<Box<dyn MountTarget>>,
    loader: Option<Box<dyn ImageLoader>>,
    fonts: Option<FontLibrary>,
    scene: Option<Box<dyn SceneGraphSink>>,
    on_load: Option<LoadHook>,
    hooks: Hooks,
}

impl PageVisualizerBuilder {
    fn new() -> Self {
        Self {
            config: VisualizerConfig::default(),
            mount: None,
            loader: None,
            fonts: None,
            scene: None,
            on_load: None,
            hooks: Hooks::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: VisualizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Backend selector.
    pub fn mode(mut self, mode: RenderingMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Styles merged over the defaults.
    pub fn global_styles(mut self, styles: PartialGlobalStyles) -> Self {
        self.config.global_styles = Some(styles);
        self
    }

    /// Host that displays the surface. A [`HeadlessMount`] when unset.
    pub fn mount(mut self, mount: impl MountTarget + 'static) -> Self {
        self.mount = Some(Box::new(mount));
        self
    }

    /// Image source fetcher. A [`DefaultImageLoader`] when unset.
    pub fn loader(mut self, loader: impl ImageLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Font library. System fonts plus the configured font directories when unset.
    pub fn fonts(mut self, fonts: FontLibrary) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Scene graph receiving animations. A [`DetachedScene`] when unset.
    pub fn scene(mut self, scene: impl SceneGraphSink + 'static) -> Self {
        self.scene = Some(Box::new(scene));
        self
    }

    /// Called once after the surface is attached.
    pub fn on_load(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.on_load = Some(Box::new(hook));
        self
    }

    /// Called after every successful render.
    pub fn on_render(mut self, hook: impl FnMut(&Page) + 'static) -> Self {
        self.hooks.on_render = Some(Box::new(hook));
        self
    }

    /// Called with rendering and export failures before they are returned.
    pub fn on_error(mut self, hook: impl FnMut(&PagevisError) + 'static) -> Self {
        self.hooks.on_error = Some(Box::new(hook));
        self
    }

    /// Validate the configuration, create the surface and attach it to the mount target.
    pub fn build(self) -> PagevisResult<PageVisualizer> {
        validate_config(&self.config)?;
        let styles = self.config.resolved_styles();
        validate_global_styles(&styles)?;

        let width = surface_dim(styles.page_width, "pageWidth")?;
        let height = surface_dim(styles.page_height, "pageHeight")?;
        let ctx = RenderingContext::new(width, height);

        let fonts = match self.fonts {
            Some(fonts) => fonts,
            None => FontLibrary::with_dirs(&self.config.font_dirs),
        };
        let deps = RendererDeps {
            loader: self
                .loader
                .unwrap_or_else(|| Box::new(DefaultImageLoader::new())),
            fonts,
        };
        let renderer = create_renderer(self.config.mode, &ctx, deps)?;

        let mut mount = self
            .mount
            .unwrap_or_else(|| Box::new(HeadlessMount::new()));
        mount.attach(&SurfaceDescriptor {
            mode: self.config.mode,
            width,
            height,
        })?;
        mount.observe_resize(true);
        tracing::debug!(mode = ?self.config.mode, width, height, "surface attached");

        if let Some(hook) = self.on_load {
            hook();
        }

        Ok(PageVisualizer {
            viewport: self.config.viewport,
            mode: self.config.mode,
            styles,
            ctx,
            current_page: None,
            pending_resize: None,
            hooks: self.hooks,
            live: Some(Live {
                renderer,
                mount,
                scene: self.scene.unwrap_or_else(|| Box::new(DetachedScene)),
            }),
        })
    }
}

/// Controller owning one surface and the page shown on it.
///
/// A visualizer is active from construction until [`PageVisualizer::destroy`]; afterwards every
/// operation except `destroy` fails with [`PagevisError::Lifecycle`].
pub struct PageVisualizer {
    mode: RenderingMode,
    viewport: Option<Viewport>,
    styles: GlobalStyles,
    ctx: RenderingContext,
    current_page: Option<Page>,
    pending_resize: Option<(u32, u32)>,
    hooks: Hooks,
    live: Option<Live>,
}

impl std::fmt::Debug for PageVisualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageVisualizer")
            .field("mode", &self.mode)
            .field("ctx", &self.ctx)
            .field("page", &self.current_page.as_ref().map(|p| &p.id))
            .field("destroyed", &self.live.is_none())
            .finish_non_exhaustive()
    }
}

impl PageVisualizer {
    /// Builder with default configuration.
    pub fn builder() -> PageVisualizerBuilder {
        PageVisualizerBuilder::new()
    }

    /// Visualizer for `config` with default collaborators.
    pub fn new(config: VisualizerConfig) -> PagevisResult<Self> {
        Self::builder().config(config).build()
    }

    fn live_mut(&mut self, op: &str) -> PagevisResult<&mut Live> {
        self.live.as_mut().ok_or_else(|| destroyed(op))
    }

    fn live(&self, op: &str) -> PagevisResult<&Live> {
        self.live.as_ref().ok_or_else(|| destroyed(op))
    }

    fn effective_viewport(&self) -> Viewport {
        self.viewport.unwrap_or_else(|| self.ctx.viewport())
    }

    /// Validate `page`, keep it as the current page and paint it.
    ///
    /// Paint failures are wrapped in [`PagevisError::Rendering`] and passed to the error hook
    /// before being returned. The page stays current either way.
    #[tracing::instrument(skip(self, page), fields(page_id = %page.id))]
    pub fn render_page(&mut self, page: Page) -> PagevisResult<()> {
        self.live("render_page")?;
        validate_page(&page)?;
        self.current_page = Some(page);
        self.paint_current().map(|_| ())
    }

    // Paints the current page; `Ok(false)` when there is none.
    fn paint_current(&mut self) -> PagevisResult<bool> {
        let viewport = self.effective_viewport();
        let ctx = self.ctx;
        let Some(live) = self.live.as_mut() else {
            return Err(destroyed("render"));
        };
        let Some(page) = self.current_page.as_ref() else {
            return Ok(false);
        };

        match live
            .renderer
            .render_page(page, &ctx, viewport, live.scene.as_mut())
        {
            Ok(()) => {
                tracing::debug!(page_id = %page.id, "page rendered");
                self.hooks.rendered(page);
                Ok(true)
            }
            Err(e) => {
                let err = PagevisError::rendering(e);
                tracing::warn!(page_id = %page.id, error = %err, "page render failed");
                self.hooks.failed(&err);
                Err(err)
            }
        }
    }

    /// Encode the surface as a data URL.
    ///
    /// Raster surfaces export `png` and `jpeg`, vector surfaces export `svg`. Any other pairing,
    /// and `pdf` everywhere, is [`PagevisError::Unsupported`].
    #[tracing::instrument(skip(self, options), fields(format = options.format.as_str()))]
    pub fn export_page(&mut self, options: &ExportOptions) -> PagevisResult<String> {
        self.live("export_page")?;
        if self.current_page.is_none() {
            return Err(PagevisError::NoPage);
        }
        validate_export_options(options)?;

        let result = export_support(self.mode, options.format).and_then(|()| {
            self.live("export_page")?
                .renderer
                .data_url(options.format, options.quality)
        });
        if let Err(e) = &result {
            tracing::warn!(error = %e, "export failed");
            self.hooks.failed(e);
        }
        result
    }

    /// Apply a new surface size, then re-render the current page.
    ///
    /// A failed re-render goes to the error hook only; the current page is kept.
    pub fn resize(&mut self, width: u32, height: u32) -> PagevisResult<()> {
        self.apply_dimension_change(width, height)?;
        if let Err(e) = self.rerender() {
            tracing::warn!(width, height, error = %e, "re-render after resize failed");
        }
        Ok(())
    }

    /// Resize the surface and recompute the scale without painting.
    pub fn apply_dimension_change(&mut self, width: u32, height: u32) -> PagevisResult<()> {
        self.live("resize")?;
        if width == 0 || height == 0 || width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
            return Err(PagevisError::validation(format!(
                "surface size {width}x{height} must be within 1..={MAX_SURFACE_DIM}"
            )));
        }
        let scale = (f64::from(width) / self.styles.page_width)
            .min(f64::from(height) / self.styles.page_height);

        let mut ctx = self.ctx;
        self.live_mut("resize")?
            .renderer
            .resize(&mut ctx, width, height)?;
        ctx.scale = scale;
        self.ctx = ctx;
        tracing::debug!(width, height, scale, "dimensions changed");
        Ok(())
    }

    /// Paint the current page again. `Ok(false)` when no page is current.
    pub fn rerender(&mut self) -> PagevisResult<bool> {
        self.live("rerender")?;
        self.paint_current()
    }

    /// Record a host size change. Only the latest request is kept until
    /// [`PageVisualizer::flush_resize`].
    pub fn request_resize(&mut self, width: u32, height: u32) -> PagevisResult<()> {
        self.live("request_resize")?;
        self.pending_resize = Some((width, height));
        Ok(())
    }

    /// Apply the latest requested size, if any. Returns whether a resize happened.
    pub fn flush_resize(&mut self) -> PagevisResult<bool> {
        self.live("flush_resize")?;
        match self.pending_resize.take() {
            Some((width, height)) => self.resize(width, height).map(|()| true),
            None => Ok(false),
        }
    }

    /// Merge `partial` into the global styles, resize the surface to the page size and re-render.
    pub fn update_global_styles(&mut self, partial: &PartialGlobalStyles) -> PagevisResult<()> {
        self.live("update_global_styles")?;
        validate_partial_styles(partial)?;
        let styles = self.styles.merged(partial);
        validate_global_styles(&styles)?;
        let width = surface_dim(styles.page_width, "pageWidth")?;
        let height = surface_dim(styles.page_height, "pageHeight")?;

        let mut ctx = self.ctx;
        self.live_mut("update_global_styles")?
            .renderer
            .resize(&mut ctx, width, height)?;
        ctx.scale = 1.0;
        self.ctx = ctx;
        self.styles = styles;

        self.paint_current().map(|_| ())
    }

    /// Wipe the surface and forget the current page.
    pub fn clear(&mut self) -> PagevisResult<()> {
        self.live_mut("clear")?.renderer.clear();
        self.current_page = None;
        Ok(())
    }

    /// Release the surface, stop observing resizes and detach from the mount target.
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        let Some(mut live) = self.live.take() else {
            return;
        };
        live.scene.cancel_pending();
        live.renderer.destroy();
        live.mount.observe_resize(false);
        live.mount.detach();
        self.current_page = None;
        self.pending_resize = None;
        self.hooks = Hooks::default();
        tracing::debug!(mode = ?self.mode, "visualizer destroyed");
    }

    /// `true` after [`PageVisualizer::destroy`].
    pub fn is_destroyed(&self) -> bool {
        self.live.is_none()
    }

    /// Backend kind.
    pub fn mode(&self) -> RenderingMode {
        self.mode
    }

    /// Page last passed to [`PageVisualizer::render_page`], until cleared.
    pub fn current_page(&self) -> Option<&Page> {
        self.current_page.as_ref()
    }

    /// Current surface size and scale.
    pub fn context(&self) -> RenderingContext {
        self.ctx
    }

    /// Current global styles.
    pub fn global_styles(&self) -> &GlobalStyles {
        &self.styles
    }

    /// Copy of the surface contents.
    pub fn snapshot(&self) -> PagevisResult<SurfaceSnapshot> {
        self.live("snapshot")?.renderer.snapshot()
    }

    /// Number of decoded images cached by the renderer.
    pub fn cached_images(&self) -> PagevisResult<usize> {
        Ok(self.live("cached_images")?.renderer.cached_images())
    }
}

fn destroyed(op: &str) -> PagevisError {
    PagevisError::lifecycle(format!("{op} called on a destroyed visualizer"))
}

fn export_support(mode: RenderingMode, format: ExportFormat) -> PagevisResult<()> {
    match (mode, format) {
        (RenderingMode::Raster, ExportFormat::Png | ExportFormat::Jpeg)
        | (RenderingMode::Vector, ExportFormat::Svg) => Ok(()),
        (_, ExportFormat::Pdf) => Err(PagevisError::unsupported("pdf export is not implemented")),
        (mode, format) => Err(PagevisError::unsupported(format!(
            "{mode:?} surfaces cannot export {}",
            format.as_str()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visualizer/controller.rs"]
mod tests;
