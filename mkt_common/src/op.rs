/// Implements the standard operator traits for single-field tuple structs by delegating to the
/// inner value. Invoke from the module that owns the type, since the macro reaches into `.0`.
#[macro_export]
macro_rules! op {
    (binary $t:ty, $trt:ident, $mth:ident) => {
        impl $trt for $t {
            type Output = Self;

            fn $mth(self, rhs: Self) -> Self::Output {
                Self(self.0.$mth(rhs.0))
            }
        }
    };
    (inplace $t:ty, $trt:ident, $mth:ident) => {
        impl $trt for $t {
            fn $mth(&mut self, rhs: Self) {
                self.0.$mth(rhs.0)
            }
        }
    };
    (unary $t:ty, $trt:ident, $mth:ident) => {
        impl $trt for $t {
            type Output = Self;

            fn $mth(self) -> Self::Output {
                Self(self.0.$mth())
            }
        }
    };
}
