//! Macro declarativa para items de datos.
//!
//! Forma base (template con slots libres):
//!
//! ```ignore
//! data_item! {
//!     /// Exposición cruda de imagen.
//!     pub ImageRaw {
//!         name: "{band}_IMAGE_{target}_RAW",
//!         title: "{band} {target} raw image",
//!         description: "Raw {target} exposure in the {band} band",
//!         group: Raw,
//!         frame_type: Image,
//!         restrict { band: ["LM", "N"] },
//!         extensions { "DET1.DATA" => Image },
//!     }
//! }
//! ```
//!
//! Forma derivada (hereda del padre y liga slots):
//!
//! ```ignore
//! data_item! { pub LmImageRaw: ImageRaw { bind { band = "LM" } } }
//! ```

#[macro_export]
macro_rules! data_item {
    // ---------------- Template base ----------------
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident {
            name: $tag:expr,
            title: $title:expr,
            description: $desc:expr,
            group: $group:ident,
            $(level: $level:ident,)?
            frame_type: $ftype:ident
            $(, bind { $($bslot:ident = $bval:expr),* $(,)? })?
            $(, restrict { $($rslot:ident : [$($rval:expr),+ $(,)?]),* $(,)? })?
            $(, extensions { $($ext:expr => $etype:ident),* $(,)? })?
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::item::DataItem for $name {
            fn template() -> $crate::item::ItemTemplate {
                let t = $crate::item::ItemTemplate::new(stringify!($name), $tag)
                    .title($title)
                    .description($desc)
                    .group($crate::domain::FrameGroup::$group)
                    .frame_type($crate::domain::FrameType::$ftype);
                $(let t = t.level($crate::domain::FrameLevel::$level);)?
                $($(let t = t.bind(stringify!($bslot), $bval);)*)?
                $($(let t = t.restrict(stringify!($rslot), [$($rval),+]);)*)?
                $($(let t = t.extension($ext, $crate::domain::FrameType::$etype);)*)?
                t
            }
        }
    };

    // ---------------- Template derivado ----------------
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident : $parent:ty {
            $(title: $title:expr,)?
            bind { $($bslot:ident = $bval:expr),* $(,)? }
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::item::DataItem for $name {
            fn template() -> $crate::item::ItemTemplate {
                let t = <$parent as $crate::item::DataItem>::template().derive(stringify!($name));
                $(let t = t.title($title);)?
                $(let t = t.bind(stringify!($bslot), $bval);)*
                t
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::item::{DataItem, ItemTemplate};
    use metis_domain::{FrameGroup, FrameLevel, FrameType};

    crate::data_item! {
        /// Flat crudo.
        FlatRaw {
            name: "{band}_FLAT_{source}_RAW",
            title: "{band} {source} flat",
            description: "Raw flat illuminated by {source}",
            group: Raw,
            frame_type: Image,
            restrict { band: ["LM", "N"] },
            extensions { "DET1.DATA" => Image },
        }
    }

    crate::data_item! {
        MasterTable {
            name: "MASTER_TABLE",
            title: "Master table",
            description: "",
            group: Calib,
            level: Final,
            frame_type: Table
        }
    }

    crate::data_item! { LmFlatRaw: FlatRaw { bind { band = "LM" } } }

    #[test]
    fn base_form_fills_every_attribute() {
        let t = FlatRaw::template();
        assert_eq!(t.id, "FlatRaw");
        assert_eq!(t.group, Some(FrameGroup::Raw));
        assert_eq!(t.frame_type, Some(FrameType::Image));
        assert_eq!(t.level, None);
        assert_eq!(t.domain.values("band").map(|v| v.len()), Some(2));
        assert_eq!(t.layout.len(), 1);
        assert!(t.is_abstract());

        let m = ItemTemplate::of::<MasterTable>();
        assert_eq!(m.level, Some(FrameLevel::Final));
        assert!(!m.is_abstract());
    }

    #[test]
    fn derived_form_inherits_and_binds() {
        let t = LmFlatRaw::template();
        assert_eq!(t.parent.as_deref(), Some("FlatRaw"));
        assert_eq!(t.resolved_name(), "LM_FLAT_{source}_RAW");
        assert_eq!(t.layout.len(), 1);
    }
}
