//! Reserved identifiers of the OpenMfx protocol, reproduced verbatim.

pub const MESH_EFFECT_PLUGIN_API: &str = "OfxMeshEffectPluginAPI";
pub const MESH_EFFECT_API_VERSION: i32 = 1;

// Suites
pub const PROPERTY_SUITE: &str = "OfxPropertySuite";
pub const PARAMETER_SUITE: &str = "OfxParameterSuite";
pub const MESH_EFFECT_SUITE: &str = "OfxMeshEffectSuite";
pub const MESSAGE_SUITE: &str = "OfxMessageSuite";

// Attachments
pub const MESH_ATTRIB_POINT: &str = "OfxMeshAttribPoint";
pub const MESH_ATTRIB_CORNER: &str = "OfxMeshAttribCorner";
pub const MESH_ATTRIB_FACE: &str = "OfxMeshAttribFace";
pub const MESH_ATTRIB_MESH: &str = "OfxMeshAttribMesh";

// Mandatory attributes
pub const MESH_ATTRIB_POINT_POSITION: &str = "OfxMeshAttribPointPosition";
pub const MESH_ATTRIB_CORNER_POINT: &str = "OfxMeshAttribCornerPoint";
pub const MESH_ATTRIB_FACE_SIZE: &str = "OfxMeshAttribFaceSize";

// Element types
pub const MESH_ATTRIB_TYPE_UBYTE: &str = "OfxMeshAttribTypeUByte";
pub const MESH_ATTRIB_TYPE_INT: &str = "OfxMeshAttribTypeInt";
pub const MESH_ATTRIB_TYPE_FLOAT: &str = "OfxMeshAttribTypeFloat";

// Attribute semantics
pub const MESH_ATTRIB_SEMANTIC_TEXTURE_COORDINATE: &str = "OfxMeshAttribSemanticTextureCoordinate";
pub const MESH_ATTRIB_SEMANTIC_NORMAL: &str = "OfxMeshAttribSemanticNormal";
pub const MESH_ATTRIB_SEMANTIC_COLOR: &str = "OfxMeshAttribSemanticColor";
pub const MESH_ATTRIB_SEMANTIC_WEIGHT: &str = "OfxMeshAttribSemanticWeight";

// Attribute properties
pub const MESH_ATTRIB_PROP_DATA: &str = "OfxMeshAttribPropData";
pub const MESH_ATTRIB_PROP_IS_OWNER: &str = "OfxMeshAttribPropIsOwner";
pub const MESH_ATTRIB_PROP_STRIDE: &str = "OfxMeshAttribPropStride";
pub const MESH_ATTRIB_PROP_COMPONENT_COUNT: &str = "OfxMeshAttribPropComponentCount";
pub const MESH_ATTRIB_PROP_TYPE: &str = "OfxMeshAttribPropType";
pub const MESH_ATTRIB_PROP_SEMANTIC: &str = "OfxMeshAttribPropSemantic";

// Inputs
pub const MESH_MAIN_INPUT: &str = "OfxMeshMainInput";
pub const MESH_MAIN_OUTPUT: &str = "OfxMeshMainOutput";

// Mesh properties
pub const MESH_PROP_POINT_COUNT: &str = "OfxMeshPropPointCount";
pub const MESH_PROP_CORNER_COUNT: &str = "OfxMeshPropCornerCount";
pub const MESH_PROP_FACE_COUNT: &str = "OfxMeshPropFaceCount";

// Actions
pub const ACTION_LOAD: &str = "OfxActionLoad";
pub const ACTION_UNLOAD: &str = "OfxActionUnload";
pub const ACTION_DESCRIBE: &str = "OfxActionDescribe";
pub const ACTION_CREATE_INSTANCE: &str = "OfxActionCreateInstance";
pub const ACTION_DESTROY_INSTANCE: &str = "OfxActionDestroyInstance";
pub const MESH_EFFECT_ACTION_COOK: &str = "OfxMeshEffectActionCook";

// Parameter types
pub const PARAM_TYPE_INTEGER: &str = "OfxParamTypeInteger";
pub const PARAM_TYPE_DOUBLE: &str = "OfxParamTypeDouble";
pub const PARAM_TYPE_BOOLEAN: &str = "OfxParamTypeBoolean";
pub const PARAM_TYPE_CHOICE: &str = "OfxParamTypeChoice";
pub const PARAM_TYPE_RGBA: &str = "OfxParamTypeRGBA";
pub const PARAM_TYPE_RGB: &str = "OfxParamTypeRGB";
pub const PARAM_TYPE_DOUBLE_2D: &str = "OfxParamTypeDouble2D";
pub const PARAM_TYPE_INTEGER_2D: &str = "OfxParamTypeInteger2D";
pub const PARAM_TYPE_DOUBLE_3D: &str = "OfxParamTypeDouble3D";
pub const PARAM_TYPE_INTEGER_3D: &str = "OfxParamTypeInteger3D";
pub const PARAM_TYPE_STRING: &str = "OfxParamTypeString";
pub const PARAM_TYPE_CUSTOM: &str = "OfxParamTypeCustom";
pub const PARAM_TYPE_GROUP: &str = "OfxParamTypeGroup";
pub const PARAM_TYPE_PAGE: &str = "OfxParamTypePage";
pub const PARAM_TYPE_PUSH_BUTTON: &str = "OfxParamTypePushButton";

// Parameter properties
pub const PARAM_PROP_DEFAULT: &str = "OfxParamPropDefault";
pub const PARAM_PROP_TYPE: &str = "OfxParamPropType";

// Generic properties
pub const PROP_NAME: &str = "OfxPropName";
pub const PROP_LABEL: &str = "OfxPropLabel";
pub const PROP_VERSION: &str = "OfxPropVersion";
pub const PROP_VERSION_LABEL: &str = "OfxPropVersionLabel";

// Message types
pub const MESSAGE_FATAL: &str = "OfxMessageFatal";
pub const MESSAGE_ERROR: &str = "OfxMessageError";
pub const MESSAGE_WARNING: &str = "OfxMessageWarning";
pub const MESSAGE_MESSAGE: &str = "OfxMessageMessage";
pub const MESSAGE_LOG: &str = "OfxMessageLog";
pub const MESSAGE_QUESTION: &str = "OfxMessageQuestion";
