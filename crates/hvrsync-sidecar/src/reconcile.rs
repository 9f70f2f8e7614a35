//! Staleness policy
//!
//! Each tracked property is written when either
//!
//! - a digest was stored before (the sidecar was machine-synced and has
//!   drifted, so the index overrides any edit made since), or
//! - the property does not exist yet.
//!
//! On a first sync this only fills gaps, leaving hand-authored values
//! alone. Once a digest has been stored, every later sync against changed
//! index bytes is authoritative.
//!
//! Reconciliation only calls container setters. It never touches files.

use crate::Result;
use crate::container::{MetadataContainer, ns};
use hvrsync_formats::TechnicalMetadata;
use tracing::debug;

/// Property groups kept in step with the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackedProperty {
    /// `xmpDM:videoFrameSize` (HD only)
    FrameSize,
    /// `xmpDM:videoPixelAspectRatio` (HD only)
    PixelAspectRatio,
    /// `xmpDM:startTimeScale`
    StartTimeScale,
    /// `xmpDM:startTimeSampleSize`
    StartTimeSampleSize,
    /// `xmpDM:duration`
    Duration,
    /// `xmpDM:startTimecode`
    StartTimecode,
    /// `xmp:CreateDate`
    CreateDate,
    /// `xmpDM:videoFrameRate`
    FrameRate,
}

impl TrackedProperty {
    /// All tracked property groups, in reconciliation order
    pub const ALL: [Self; 8] = [
        Self::FrameSize,
        Self::PixelAspectRatio,
        Self::StartTimeScale,
        Self::StartTimeSampleSize,
        Self::Duration,
        Self::StartTimecode,
        Self::CreateDate,
        Self::FrameRate,
    ];

    /// Namespace URI of the property
    pub fn namespace(self) -> &'static str {
        match self {
            Self::CreateDate => ns::XMP,
            _ => ns::DM,
        }
    }

    /// Property name
    pub fn name(self) -> &'static str {
        match self {
            Self::FrameSize => "videoFrameSize",
            Self::PixelAspectRatio => "videoPixelAspectRatio",
            Self::StartTimeScale => "startTimeScale",
            Self::StartTimeSampleSize => "startTimeSampleSize",
            Self::Duration => "duration",
            Self::StartTimecode => "startTimecode",
            Self::CreateDate => "CreateDate",
            Self::FrameRate => "videoFrameRate",
        }
    }
}

/// What a reconciliation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Groups whose stored value changed
    pub written: Vec<TrackedProperty>,
    /// Groups left alone because they already existed on a first sync
    pub protected: Vec<TrackedProperty>,
}

impl ReconcileReport {
    /// Whether any property changed
    pub fn changed(&self) -> bool {
        !self.written.is_empty()
    }
}

struct Reconciler<'a, C> {
    container: &'a mut C,
    authoritative: bool,
    report: ReconcileReport,
}

impl<C: MetadataContainer> Reconciler<'_, C> {
    fn may_write(&mut self, property: TrackedProperty) -> bool {
        if self.authoritative || !self.container.has_property(property.namespace(), property.name())
        {
            true
        } else {
            debug!("Keeping existing {}", property.name());
            self.report.protected.push(property);
            false
        }
    }

    fn mark_written(&mut self, property: TrackedProperty) {
        debug!("Updated {}", property.name());
        self.report.written.push(property);
    }

    /// Set a simple property, replacing whatever was there
    fn simple(&mut self, property: TrackedProperty, value: &str) -> Result<()> {
        if !self.may_write(property) {
            return Ok(());
        }
        let (ns, name) = (property.namespace(), property.name());
        if self.container.property(ns, name) != Some(value) {
            self.container.set_property(ns, name, value, true)?;
            self.mark_written(property);
        }
        Ok(())
    }

    /// Drop a simple value sitting where a struct belongs
    ///
    /// Only reached once writing is allowed, so on a first sync the slot
    /// was empty and nothing is dropped.
    fn clear_simple_value(&mut self, property: TrackedProperty) {
        let (ns, name) = (property.namespace(), property.name());
        if self.container.property(ns, name).is_some() {
            debug!("Replacing simple {} with a struct", name);
            self.container.delete_property(ns, name);
        }
    }

    /// Set struct fields, each only when it differs
    fn fields(
        &mut self,
        property: TrackedProperty,
        field_ns: &str,
        fields: &[(&str, &str)],
    ) -> Result<()> {
        if !self.may_write(property) {
            return Ok(());
        }
        self.clear_simple_value(property);
        let (ns, name) = (property.namespace(), property.name());
        let mut changed = false;
        for &(field, value) in fields {
            if self.container.struct_field(ns, name, field_ns, field) != Some(value) {
                self.container
                    .set_struct_field(ns, name, field_ns, field, value)?;
                changed = true;
            }
        }
        if changed {
            self.mark_written(property);
        }
        Ok(())
    }

    fn start_timecode(&mut self, meta: &TechnicalMetadata) -> Result<()> {
        let Some(format) = meta.timecode_format() else {
            return Ok(());
        };
        if !self.may_write(TrackedProperty::StartTimecode) {
            return Ok(());
        }

        // Value and format travel together and only when the value moved
        let property = TrackedProperty::StartTimecode;
        self.clear_simple_value(property);
        let (ns, name) = (property.namespace(), property.name());
        let value = meta.start_timecode.to_string();
        if self.container.struct_field(ns, name, ns::DM, "timeValue") != Some(value.as_str()) {
            self.container
                .set_struct_field(ns, name, ns::DM, "timeValue", &value)?;
            self.container
                .set_struct_field(ns, name, ns::DM, "timeFormat", format.as_str())?;
            self.mark_written(property);
        }
        Ok(())
    }
}

/// Apply decoded technical metadata to a container
///
/// `prior_digest_present` is whether the container held a stored digest
/// before this sync, regardless of whether it matched.
pub fn reconcile<C: MetadataContainer>(
    container: &mut C,
    meta: &TechnicalMetadata,
    prior_digest_present: bool,
) -> Result<ReconcileReport> {
    let mut r = Reconciler {
        container,
        authoritative: prior_digest_present,
        report: ReconcileReport::default(),
    };

    if let Some(size) = meta.frame_size {
        let (width, height) = (size.width.to_string(), size.height.to_string());
        r.fields(
            TrackedProperty::FrameSize,
            ns::DIMENSIONS,
            &[("w", width.as_str()), ("h", height.as_str()), ("unit", size.unit)],
        )?;
    }

    if let Some(par) = meta.pixel_aspect_ratio {
        r.simple(TrackedProperty::PixelAspectRatio, par)?;
    }

    if let Some(rate) = meta.frame_rate {
        r.simple(TrackedProperty::StartTimeScale, &rate.sample_scale().to_string())?;
        r.simple(TrackedProperty::StartTimeSampleSize, &rate.sample_size().to_string())?;

        let frames = meta.total_frames.to_string();
        let scale = rate.duration_scale();
        r.fields(
            TrackedProperty::Duration,
            ns::DM,
            &[("value", frames.as_str()), ("scale", scale.as_str())],
        )?;
    }

    r.start_timecode(meta)?;

    if let Some(date) = &meta.creation_date {
        r.simple(TrackedProperty::CreateDate, date)?;
    }

    if let Some(rate) = meta.frame_rate {
        r.simple(TrackedProperty::FrameRate, rate.label())?;
    }

    Ok(r.report)
}
