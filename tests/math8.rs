mod tests {
    use fibonacci_clock::math8::{
        blend8, ease_in_out_quad, ratio8, scale8, scale_linear, triangle8,
    };

    #[test]
    fn test_scale8() {
        assert_eq!(scale8(255, 128), 128);
        assert_eq!(scale8(0, 128), 0);
        assert_eq!(scale8(128, 128), 64);
        assert_eq!(scale8(128, 255), 128);
        assert_eq!(scale8(128, 0), 0);
    }

    #[test]
    fn test_blend8() {
        assert_eq!(blend8(255, 128, 128), 191);
        assert_eq!(blend8(0, 128, 255), 128);
        assert_eq!(blend8(255, 0, 128), 127);
        assert_eq!(blend8(255, 128, 0), 255);
    }

    #[test]
    fn test_ratio8() {
        assert_eq!(ratio8(0, 8), 0);
        assert_eq!(ratio8(4, 8), 128);
        assert_eq!(ratio8(8, 8), 255);
        assert_eq!(ratio8(3, 0), 0);
    }

    #[test]
    fn test_triangle8() {
        assert_eq!(triangle8(0), 0);
        assert_eq!(triangle8(64), 128);
        assert_eq!(triangle8(128), 254);
        assert_eq!(triangle8(255), 0);
    }

    #[test]
    fn test_ease_in_out_quad() {
        assert_eq!(ease_in_out_quad(0), 0);
        assert_eq!(ease_in_out_quad(255), 255);
        assert!(ease_in_out_quad(64) < 64);
        assert!(ease_in_out_quad(192) > 192);
    }

    #[test]
    fn test_scale_linear() {
        assert_eq!(scale_linear(255, 0.5), 127);
        assert_eq!(scale_linear(255, 1.0), 255);
        assert_eq!(scale_linear(200, 0.0), 0);
        assert_eq!(scale_linear(200, 2.0), 255);
        assert_eq!(scale_linear(200, -1.0), 0);
        assert_eq!(scale_linear(200, f32::NAN), 0);
    }
}
