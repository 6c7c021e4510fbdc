use std::fmt::{self, Write};

pub trait Render {
    fn render(&self, out: &mut dyn Write) -> fmt::Result;
}

impl<T> Render for Option<T>
where
    T: Render,
{
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        match self {
            Some(inner) => inner.render(out),
            None => Ok(()),
        }
    }
}

impl<T> Render for Vec<T>
where
    T: Render,
{
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        for item in self {
            item.render(out)?;
        }
        Ok(())
    }
}

/// Render anything to a fresh `String`.
pub fn render_to_string<R: Render + ?Sized>(value: &R) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = value.render(&mut out);
    out
}

/// Implement [`Render`] as escaped text using the type's `Display`.
#[macro_export]
macro_rules! impl_display_render {
    ($type:ty) => {
        impl $crate::Render for $type {
            fn render(&self, out: &mut dyn ::std::fmt::Write) -> ::std::fmt::Result {
                out.write_str(&$crate::escape_html(&self.to_string()))
            }
        }
    };
}

impl_display_render!(String);
impl_display_render!(&str);
