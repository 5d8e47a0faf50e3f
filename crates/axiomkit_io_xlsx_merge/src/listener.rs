//! Area listener capability and render-session scoped registration.
//!
//! Template declarations stay immutable; everything attached during a render
//! pass lives in [`RenderSession`] and is dropped with it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::context::RenderContext;
use crate::document::SheetDocument;
use crate::spec::{
    SpecCellAddress, SpecEachCommand, SpecMergeOptions, SpecRegion, XlsxMergeError,
};
use crate::tracker::SpanTracker;

////////////////////////////////////////////////////////////////////////////////
// #region ListenerCapability

/// Observer of cell materialization inside one or more areas.
///
/// The expander notifies listeners of nested areas before those of the enclosing
/// area for the same data item.
pub trait AreaListener: fmt::Debug {
    /// Called before an area is applied at `anchor`.
    fn before_apply_at_cell(&mut self, _anchor: &SpecCellAddress) {}

    /// Called after an area has been applied at `anchor`.
    fn after_apply_at_cell(&mut self, _anchor: &SpecCellAddress) {}

    /// Called before template cell `src` is written to `target`.
    fn before_transform_cell(&mut self, _src: &SpecCellAddress, _target: &SpecCellAddress) {}

    /// Called after template cell `src` has been written to `target`.
    fn after_transform_cell(
        &mut self,
        src: &SpecCellAddress,
        target: &SpecCellAddress,
        doc: &mut dyn SheetDocument,
    ) -> Result<(), XlsxMergeError>;
}

/// Listener handle shared between the areas it watches.
pub type SharedAreaListener = Rc<RefCell<dyn AreaListener>>;

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RenderSession

/// What a declaration attached on its first activation.
#[derive(Debug, Clone)]
enum EnumRegistration {
    /// Externally supplied listener, or nothing when no name was configured.
    External(Option<SharedAreaListener>),
    /// Self-constructed span tracker.
    Tracker(Rc<RefCell<SpanTracker>>),
}

/// Attachments of one render pass.
///
/// Attachments and registrations are keyed by the template region of the
/// declaring command. A template must not hold two commands with the same
/// sheet and bounds: they would share one registration and one listener list.
#[derive(Debug, Default)]
pub struct RenderSession {
    dict_listeners_by_area: BTreeMap<SpecRegion, Vec<SharedAreaListener>>,
    dict_registrations: BTreeMap<SpecRegion, EnumRegistration>,
    merge_options: SpecMergeOptions,
}

impl RenderSession {
    /// Empty session with default merge options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the same session with `merge_options` for self-constructed trackers.
    pub fn with_merge_options(mut self, merge_options: SpecMergeOptions) -> Self {
        self.merge_options = merge_options;
        self
    }

    /// Merge options handed to self-constructed trackers.
    pub fn merge_options(&self) -> &SpecMergeOptions {
        &self.merge_options
    }

    /// Attach `listener` to the area with template region `region`.
    pub fn add_area_listener(&mut self, region: &SpecRegion, listener: SharedAreaListener) {
        self.dict_listeners_by_area
            .entry(region.clone())
            .or_default()
            .push(listener);
    }

    /// Listeners attached to the area with template region `region`.
    pub fn listeners_of(&self, region: &SpecRegion) -> &[SharedAreaListener] {
        self.dict_listeners_by_area
            .get(region)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the declaration owning `region` has been activated in this session.
    pub fn is_registered(&self, region: &SpecRegion) -> bool {
        self.dict_registrations.contains_key(region)
    }

    /// Span tracker self-constructed by the merge declaration owning `region`.
    pub fn tracker_of(&self, region: &SpecRegion) -> Option<Rc<RefCell<SpanTracker>>> {
        match self.dict_registrations.get(region) {
            Some(EnumRegistration::Tracker(tracker)) => Some(Rc::clone(tracker)),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Registration

/// Attach the listener bound to `listener_name` to the command's area, once per session.
///
/// A configured name that is unbound, or bound to anything but a listener, is a
/// configuration error. `None` or an empty name attaches nothing.
pub fn register_external_listener(
    session: &mut RenderSession,
    command: &SpecEachCommand,
    listener_name: Option<&str>,
    ctx: &RenderContext,
    anchor: &SpecCellAddress,
) -> Result<(), XlsxMergeError> {
    let region = &command.area.region;
    if session.is_registered(region) {
        return Ok(());
    }

    let listener = match listener_name {
        Some(name) if !name.is_empty() => Some(ctx.get_listener(name)?),
        _ => None,
    };
    if let Some(listener) = &listener {
        session.add_area_listener(region, Rc::clone(listener));
        log::info!("register listener {listener:?} to {region} from {anchor}");
    }
    session
        .dict_registrations
        .insert(region.clone(), EnumRegistration::External(listener));
    Ok(())
}

/// Build a span tracker for a merge command and attach it to the command's area
/// and every area nested under it, once per session.
///
/// A repeated activation in the same session restarts the attached tracker with
/// `n_items` expected parent items instead of attaching a second one.
pub fn register_merge_tracker(
    session: &mut RenderSession,
    command: &SpecEachCommand,
    n_items: usize,
    anchor: &SpecCellAddress,
) -> Result<(), XlsxMergeError> {
    let region_parent = &command.area.region;
    if let Some(tracker) = session.tracker_of(region_parent) {
        tracker.borrow_mut().restart(n_items);
        return Ok(());
    }

    let l_regions_child = command.area.descendant_regions();
    let tracker = Rc::new(RefCell::new(
        SpanTracker::new(region_parent, &l_regions_child, n_items)?
            .with_merge_options(session.merge_options),
    ));
    let listener: SharedAreaListener = tracker.clone();

    log::info!("register listener {listener:?} to {region_parent} from {anchor}");
    session.add_area_listener(region_parent, Rc::clone(&listener));
    for region_child in &l_regions_child {
        log::info!("register listener {listener:?} to {region_child} by parent");
        session.add_area_listener(region_child, Rc::clone(&listener));
    }

    session
        .dict_registrations
        .insert(region_parent.clone(), EnumRegistration::Tracker(tracker));
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
