/// Per-widget style override, falling back to the style derived from the `Ui`.
pub trait Styled {
    type Style: Clone;

    fn set_style(&mut self, style: Option<Self::Style>);

    fn styled(mut self, style: Self::Style) -> Self
    where
        Self: Sized,
    {
        self.set_style(Some(style));
        self
    }
}
