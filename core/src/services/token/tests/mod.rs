mod support;

mod verifier_tests;
